/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::{Candidate, Group};
use crate::services::duplicate_analyzer::DuplicateReport;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时按 `verbose` 选择 debug 或 info 级别
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("roster_draw={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(model_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 HR 抽奖与分组工具启动");
    info!(
        "🕒 启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 LLM 模型: {}", model_name);
    info!("{}", "=".repeat(60));
}

/// 记录名单加载信息
pub fn log_roster_loaded(source: &str, report: &DuplicateReport) {
    info!("✓ 从 {} 载入 {} 个名字", source, report.total);
    if report.duplicate_count > 0 {
        info!(
            "⚠️ {} 位有效候选人，发现 {} 个重复项，建议先去重",
            report.unique_count, report.duplicate_count
        );
    } else {
        info!("✓ {} 位有效候选人就绪", report.unique_count);
    }
}

/// 记录抽奖结果
///
/// # 参数
/// - `round`: 第几位中奖者（从 1 开始）
/// - `winner`: 中奖者
/// - `remaining`: 剩余可抽人数
pub fn log_draw_result(round: usize, winner: &Candidate, remaining: usize) {
    info!("\n{}", "─".repeat(60));
    info!("🏆 #{} 获奖者是: {}", round, winner.name);
    info!("📋 待抽人数: {}", remaining);
    info!("{}", "─".repeat(60));
}

/// 打印分组结果
pub fn log_groups(groups: &[Group]) {
    info!("\n{}", "=".repeat(60));
    info!("👥 共生成 {} 个分组", groups.len());
    info!("{}", "=".repeat(60));
    for group in groups {
        let names: Vec<&str> = group.members.iter().map(|m| m.name.as_str()).collect();
        info!(
            "{} ({} 名成员): {}",
            group.name,
            group.members.len(),
            names.join("、")
        );
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
