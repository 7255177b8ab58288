//! 二次确认闸门
//!
//! 第一次触发只进入"待确认"状态，在超时窗口内再次触发才真正执行；
//! 超时后自动回到空闲状态。用于清空名单、清除中奖记录这类不可逆操作。

use std::time::{Duration, Instant};

/// 默认确认窗口
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(3);

/// 一次触发的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// 已进入待确认状态，需要再次触发
    Armed,
    /// 已确认，调用方应执行操作
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Idle,
    Armed { since: Instant },
}

#[derive(Debug, Clone)]
pub struct ConfirmGate {
    timeout: Duration,
    state: GateState,
}

impl ConfirmGate {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            state: GateState::Idle,
        }
    }

    pub fn trigger(&mut self) -> GateOutcome {
        self.trigger_at(Instant::now())
    }

    pub fn trigger_at(&mut self, now: Instant) -> GateOutcome {
        if self.is_armed_at(now) {
            self.state = GateState::Idle;
            GateOutcome::Confirmed
        } else {
            self.state = GateState::Armed { since: now };
            GateOutcome::Armed
        }
    }

    pub fn is_armed(&self) -> bool {
        self.is_armed_at(Instant::now())
    }

    pub fn is_armed_at(&self, now: Instant) -> bool {
        match self.state {
            GateState::Idle => false,
            GateState::Armed { since } => now.saturating_duration_since(since) < self.timeout,
        }
    }

    pub fn disarm(&mut self) {
        self.state = GateState::Idle;
    }
}

impl Default for ConfirmGate {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIRM_TIMEOUT)
    }
}
