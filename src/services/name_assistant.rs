//! AI 名单助手接口
//!
//! 名单整理、语音识别、队名生成都通过这个 trait 调用，
//! 流程层只依赖 trait，测试时可以换成脚本化的实现。

use crate::error::LlmError;

#[allow(async_fn_in_trait)]
pub trait NameAssistant {
    /// 从杂乱文本中提取名字列表
    async fn clean_names(&self, raw_text: &str) -> Result<Vec<String>, LlmError>;

    /// 从录音中识别名字列表
    async fn transcribe_audio(
        &self,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<Vec<String>, LlmError>;

    /// 为每个分组生成队名，结果与分组下标对齐
    async fn name_groups(&self, groups: &[Vec<String>]) -> Result<Vec<String>, LlmError>;
}
