//! # Roster Draw
//!
//! HR 抽奖与分组工具：导入名单、去重、幸运抽奖、自动分组并导出 CSV
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 与业务无关的小型状态机
//! - `ConfirmGate` - 破坏性操作的二次确认
//! - `ActionTracker` - 同一 AI 操作不允许并发
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不持有会话状态
//! - `name_parser` / `duplicate_analyzer` / `deduplicator` - 名单处理
//! - `DrawEngine` - 抽奖与中奖记录
//! - `group_partitioner` - 洗牌分组
//! - `CsvExporter` - 写 groups_result.csv
//! - `LlmService` - `NameAssistant` 的 LLM 实现
//!
//! ### ③ 流程层（Workflow）
//! - `RosterSession` - 一次会话的全部状态及每种操作的影响
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 单次命令
//! - `orchestrator/shell` - 交互模式
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, DrawError, LlmError};
pub use infrastructure::{ConfirmGate, GateOutcome};
pub use models::{Candidate, Group};
pub use orchestrator::App;
pub use services::{CsvExporter, DrawEngine, DuplicateReport, LlmService, NameAssistant};
pub use workflow::{CleanOutcome, NamingOutcome, RosterSession};
