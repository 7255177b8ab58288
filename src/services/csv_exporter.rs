//! 分组结果导出 - 业务能力层
//!
//! 只负责"把分组写成 CSV"能力，不关心分组怎么产生

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::Group;

/// 默认导出文件名
pub const DEFAULT_EXPORT_FILE: &str = "groups_result.csv";

const CSV_HEADER: &str = "GroupName,Name,ID";

/// CSV 导出服务
///
/// 输出 UTF-8 带 BOM（方便 Excel 直接打开），每个 (组, 成员) 一行
pub struct CsvExporter {
    export_path: PathBuf,
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::with_path(DEFAULT_EXPORT_FILE)
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            export_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.export_path
    }

    /// 生成 CSV 内容
    ///
    /// 组名和姓名中的逗号替换为空格，避免破坏列结构
    pub fn render(groups: &[Group]) -> String {
        let mut csv = String::from('\u{feff}');
        csv.push_str(CSV_HEADER);
        csv.push('\n');

        for group in groups {
            let group_name = sanitize(&group.name);
            for member in &group.members {
                csv.push_str(&format!(
                    "{},{},{}\n",
                    group_name,
                    sanitize(&member.name),
                    member.id
                ));
            }
        }
        csv
    }

    /// 写入导出文件
    ///
    /// # 返回
    /// 返回写入的数据行数（不含表头）
    pub async fn write(&self, groups: &[Group]) -> AppResult<usize> {
        let content = Self::render(groups);
        let rows: usize = groups.iter().map(Group::len).sum();

        debug!(
            "写入分组结果: {} 组 | {} 行 | {} 字节",
            groups.len(),
            rows,
            content.len()
        );

        tokio::fs::write(&self.export_path, content.as_bytes())
            .await
            .map_err(|e| AppError::file_write_failed(self.export_path.display().to_string(), e))?;

        info!("💾 分组结果已导出至: {}", self.export_path.display());
        Ok(rows)
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// 逗号与换行都会破坏行列结构，统一替换为空格
fn sanitize(field: &str) -> String {
    field.replace([',', '\r', '\n'], " ")
}
