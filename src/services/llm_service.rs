//! LLM 服务 - 业务能力层
//!
//! 只负责"让 LLM 处理名单"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）
//!
//! 所有调用都是单次请求，不自动重试；失败由调用方决定是否兜底。

use std::sync::LazyLock;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartAudio,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, InputAudio,
        InputAudioFormat,
    },
    Client,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;
use crate::services::name_assistant::NameAssistant;
use crate::utils::logging::truncate_text;

static JSON_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("json array pattern is valid"));

const SYSTEM_MESSAGE: &str = "你是一个严谨的名单整理助手。你只输出 JSON，不输出任何解释。";

/// 随请求发送的音频
struct AudioPayload {
    data: String,
    format: InputAudioFormat,
}

/// LLM 服务
///
/// 职责：
/// - 从文本或录音中提取名字
/// - 为分组生成队名
/// - 把 LLM 的回复解析为字符串列表
pub struct LlmService {
    client: Client<OpenAIConfig>,
    has_api_key: bool,
    model_name: String,
    audio_model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            has_api_key: !config.llm_api_key.trim().is_empty(),
            model_name: config.llm_model_name.clone(),
            audio_model_name: config.llm_audio_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `model`: 模型名称
    /// - `user_message`: 用户消息内容
    /// - `audio`: 可选的音频，会追加到用户消息中
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    async fn send_to_llm(
        &self,
        model: &str,
        user_message: &str,
        audio: Option<AudioPayload>,
    ) -> Result<String, LlmError> {
        if !self.has_api_key {
            return Err(LlmError::MissingApiKey);
        }

        debug!("调用 LLM API，模型: {}", model);
        debug!("用户消息: {}", truncate_text(user_message, 200));

        let build_failed = |e| LlmError::api_call_failed(model, e);

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_MESSAGE)
            .build()
            .map_err(build_failed)?;

        // 构建用户消息内容（支持音频）
        let user_msg = match audio {
            Some(audio) => {
                debug!("包含音频，base64 长度: {}", audio.data.len());
                let content_parts = vec![
                    ChatCompletionRequestUserMessageContentPart::InputAudio(
                        ChatCompletionRequestMessageContentPartAudio {
                            input_audio: InputAudio {
                                data: audio.data,
                                format: audio.format,
                            },
                        },
                    ),
                    ChatCompletionRequestUserMessageContentPart::Text(
                        ChatCompletionRequestMessageContentPartText {
                            text: user_message.to_string(),
                        },
                    ),
                ];
                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
                    .build()
                    .map_err(build_failed)?
            }
            None => ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(build_failed)?,
        };

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(0.2)
            .build()
            .map_err(build_failed)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::api_call_failed(model, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: model.to_string(),
            })?;

        Ok(content.trim().to_string())
    }
}

impl NameAssistant for LlmService {
    async fn clean_names(&self, raw_text: &str) -> Result<Vec<String>, LlmError> {
        let user_message = format!(
            "从以下文本中提取清晰的名字列表。文本可能包含 CSV 数据、带有换行符的纯文本或混合格式。\
             仅返回字符串的 JSON 数组。需要处理的文本：\n\n{}",
            raw_text
        );
        let response = self.send_to_llm(&self.model_name, &user_message, None).await?;
        parse_name_list(&response)
    }

    async fn transcribe_audio(
        &self,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<Vec<String>, LlmError> {
        let format = audio_format(mime_type)?;
        let payload = AudioPayload {
            data: BASE64.encode(audio),
            format,
        };
        let user_message = "请仔细听这段音频。其中包含朗读的名字列表。请转录这些名字，\
                            并以字符串的 JSON 列表形式返回。忽略任何填充词，只保留名字。";
        let response = self
            .send_to_llm(&self.audio_model_name, user_message, Some(payload))
            .await?;
        parse_name_list(&response)
    }

    async fn name_groups(&self, groups: &[Vec<String>]) -> Result<Vec<String>, LlmError> {
        let groups_json = serde_json::to_string(groups)
            .map_err(|e| LlmError::malformed(format!("{:?}", groups), e.to_string()))?;
        let user_message = format!(
            "这里有几组人员：{}。请为每组生成一个有创意、专业且有趣的中文队名。\
             返回一个与群组顺序对应的字符串 JSON 数组。",
            groups_json
        );
        let response = self.send_to_llm(&self.model_name, &user_message, None).await?;
        parse_name_list(&response)
    }
}

/// 把 MIME 类型映射为接口支持的音频格式
fn audio_format(mime_type: &str) -> Result<InputAudioFormat, LlmError> {
    let base = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match base.as_str() {
        "audio/wav" | "audio/x-wav" | "audio/wave" => Ok(InputAudioFormat::Wav),
        "audio/mpeg" | "audio/mp3" => Ok(InputAudioFormat::Mp3),
        _ => Err(LlmError::UnsupportedAudioFormat {
            mime_type: mime_type.to_string(),
        }),
    }
}

/// 解析 LLM 返回的名字列表
///
/// 允许回复被 markdown 代码块包裹或带有前后说明文字，
/// 只取第一个 `[` 到最后一个 `]` 之间的内容按字符串 JSON 数组解析
pub fn parse_name_list(response: &str) -> Result<Vec<String>, LlmError> {
    let snippet = JSON_ARRAY
        .find(response)
        .map(|m| m.as_str())
        .ok_or_else(|| LlmError::malformed(truncate_text(response, 200), "未找到 JSON 数组"))?;

    let names: Vec<String> = serde_json::from_str(snippet)
        .map_err(|e| LlmError::malformed(truncate_text(response, 200), e.to_string()))?;

    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}
