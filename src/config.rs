use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 语音识别使用的模型（需支持音频输入）
    pub llm_audio_model_name: String,
    // --- 抽奖配置 ---
    /// 洗牌动画的跳动次数
    pub draw_cycle_ticks: u32,
    /// 洗牌动画总时长（毫秒）
    pub draw_cycle_duration_ms: u64,
    /// 二次确认的等待窗口（毫秒）
    pub confirm_timeout_ms: u64,
    // --- 分组配置 ---
    /// 默认每组人数
    pub default_group_size: usize,
    /// 分组结果导出路径
    pub export_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_audio_model_name: "gpt-4o-audio-preview".to_string(),
            draw_cycle_ticks: 20,
            draw_cycle_duration_ms: 2000,
            confirm_timeout_ms: 3000,
            default_group_size: 4,
            export_path: "groups_result.csv".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 读取 TOML 配置文件（缺省字段取默认值），再应用环境变量覆盖
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn with_env_overrides(self) -> Self {
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_audio_model_name: std::env::var("LLM_AUDIO_MODEL_NAME").unwrap_or(self.llm_audio_model_name),
            draw_cycle_ticks: std::env::var("DRAW_CYCLE_TICKS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.draw_cycle_ticks),
            draw_cycle_duration_ms: std::env::var("DRAW_CYCLE_DURATION_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.draw_cycle_duration_ms),
            confirm_timeout_ms: std::env::var("CONFIRM_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.confirm_timeout_ms),
            default_group_size: std::env::var("DEFAULT_GROUP_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(self.default_group_size),
            export_path: std::env::var("EXPORT_PATH").unwrap_or(self.export_path),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }

    pub fn draw_cycle_duration(&self) -> Duration {
        Duration::from_millis(self.draw_cycle_duration_ms)
    }
}
