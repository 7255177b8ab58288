//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 把命令行或交互输入翻译成会话上的一组操作，并负责输出。
//!
//! ## 模块划分
//!
//! ### `app` - 单次命令
//! - 初始化 LLM 服务、会话和随机数源
//! - 载入名单（文件 / 演示名单，可选 AI 整理与去重）
//! - 执行 analyze / dedup / draw / group / transcribe
//!
//! ### `shell` - 交互模式
//! - 逐行读取命令，复用同一个会话
//! - 清空名单、清除中奖记录需要二次确认
//!
//! ## 层次关系
//!
//! ```text
//! app / shell (处理命令)
//!     ↓
//! workflow::RosterSession (会话状态)
//!     ↓
//! services (能力层：解析 / 去重 / 抽奖 / 分组 / 导出 / LLM)
//!     ↓
//! infrastructure (基础设施：ConfirmGate / ActionTracker)
//! ```

pub mod app;
pub mod shell;

pub use app::App;
pub use shell::Shell;
