use crate::error::{AppError, AppResult, LlmError};
use std::path::Path;
use tokio::fs;

/// 读取名单文件（.txt / .csv）的全部内容
///
/// 不做 CSV 列解析，逗号与换行一样被视为名字分隔符，由名单解析器处理
pub async fn load_roster_text(path: &Path) -> AppResult<String> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let text = String::from_utf8(bytes).map_err(|e| {
        AppError::file_read_failed(
            path.display().to_string(),
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })?;

    // Excel 导出的 CSV 常带 BOM
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text).to_string();

    tracing::info!(
        "正在加载: {}",
        path.file_name().unwrap_or_default().to_string_lossy()
    );

    Ok(text)
}

/// 读取录音文件，返回字节和按扩展名推断的 MIME 类型
///
/// 只接受 .wav / .mp3；其他扩展名在读取文件之前就返回 `UnsupportedAudioFormat`
pub async fn load_audio_bytes(path: &Path) -> AppResult<(Vec<u8>, String)> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    let mime_type = match extension.as_str() {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        _ => {
            return Err(LlmError::UnsupportedAudioFormat {
                mime_type: format!("{} (.{})", path.display(), extension),
            }
            .into())
        }
    };

    let bytes = fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    Ok((bytes, mime_type.to_string()))
}
