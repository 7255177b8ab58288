//! 基础设施层
//!
//! 与具体业务无关的小型状态机

pub mod action_tracker;
pub mod confirm_gate;

pub use action_tracker::{ActionTicket, ActionTracker};
pub use confirm_gate::{ConfirmGate, GateOutcome, DEFAULT_CONFIRM_TIMEOUT};
