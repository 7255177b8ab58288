//! 抽奖引擎 - 业务能力层
//!
//! 从可抽选的候选人中等概率抽出一位获奖者，并把结果记入中奖记录。
//!
//! ## 状态
//! - `pool`：当前名单
//! - `allow_repeats`：是否允许重复中奖
//! - `history`：中奖记录，最新的在最前面
//! - `phase`：`Idle` 或 `Cycling`（洗牌动画进行中）
//!
//! 洗牌动画期间展示的随机人选只用于显示，不会写入中奖记录，
//! 也不会影响可抽选范围；只有最后一次抽取会被提交。

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::DrawError;
use crate::infrastructure::{ConfirmGate, GateOutcome};
use crate::models::Candidate;

/// 洗牌动画节奏
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSchedule {
    /// 跳动次数
    pub ticks: u32,
    /// 总时长
    pub duration: Duration,
}

impl CycleSchedule {
    pub fn new(ticks: u32, duration: Duration) -> Self {
        Self { ticks, duration }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.draw_cycle_ticks, config.draw_cycle_duration())
    }

    /// 每次跳动的间隔
    pub fn interval(&self) -> Duration {
        self.duration / self.ticks.max(1)
    }
}

impl Default for CycleSchedule {
    fn default() -> Self {
        Self::new(20, Duration::from_millis(2000))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPhase {
    Idle,
    Cycling,
}

/// 抽奖引擎
pub struct DrawEngine {
    pool: Vec<Candidate>,
    allow_repeats: bool,
    history: VecDeque<Candidate>,
    current_winner: Option<Candidate>,
    phase: DrawPhase,
    reset_gate: ConfirmGate,
}

impl DrawEngine {
    pub fn new(pool: Vec<Candidate>) -> Self {
        Self {
            pool,
            allow_repeats: false,
            history: VecDeque::new(),
            current_winner: None,
            phase: DrawPhase::Idle,
            reset_gate: ConfirmGate::default(),
        }
    }

    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.reset_gate = ConfirmGate::new(timeout);
        self
    }

    pub fn pool(&self) -> &[Candidate] {
        &self.pool
    }

    /// 替换名单
    ///
    /// 中奖记录和当前获奖者只保留仍在新名单中的候选人（按 id 判断）
    pub fn replace_pool(&mut self, pool: Vec<Candidate>) {
        {
            let ids: HashSet<&str> = pool.iter().map(|c| c.id.as_str()).collect();
            let before = self.history.len();
            self.history.retain(|w| ids.contains(w.id.as_str()));
            if self
                .current_winner
                .as_ref()
                .is_some_and(|w| !ids.contains(w.id.as_str()))
            {
                self.current_winner = None;
            }
            if self.history.len() < before {
                debug!("名单变更，移除 {} 条失效的中奖记录", before - self.history.len());
            }
        }
        self.pool = pool;
    }

    pub fn allow_repeats(&self) -> bool {
        self.allow_repeats
    }

    pub fn set_allow_repeats(&mut self, allow: bool) {
        self.allow_repeats = allow;
    }

    /// 中奖记录，`history()[0]` 为最近一位
    pub fn history(&self) -> &VecDeque<Candidate> {
        &self.history
    }

    pub fn current_winner(&self) -> Option<&Candidate> {
        self.current_winner.as_ref()
    }

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    pub fn is_drawing(&self) -> bool {
        self.phase == DrawPhase::Cycling
    }

    /// 本次可抽选的候选人
    pub fn eligible(&self) -> Vec<&Candidate> {
        if self.allow_repeats {
            return self.pool.iter().collect();
        }
        let won: HashSet<&str> = self.history.iter().map(|w| w.id.as_str()).collect();
        self.pool
            .iter()
            .filter(|c| !won.contains(c.id.as_str()))
            .collect()
    }

    /// 待抽人数
    pub fn remaining(&self) -> usize {
        self.eligible().len()
    }

    /// 立即抽奖（无动画）
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Candidate, DrawError> {
        self.ensure_ready()?;
        self.commit(rng)
    }

    /// 进入洗牌阶段
    ///
    /// 洗牌期间再次开始抽奖会返回 `DrawInProgress`
    pub fn begin_cycle(&mut self) -> Result<(), DrawError> {
        self.ensure_ready()?;
        self.phase = DrawPhase::Cycling;
        Ok(())
    }

    /// 洗牌阶段展示用的随机人选，不提交
    pub fn preview<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Candidate> {
        self.pick(rng)
    }

    /// 结束洗牌并提交最终结果
    pub fn finish_cycle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Candidate, DrawError> {
        self.phase = DrawPhase::Idle;
        self.commit(rng)
    }

    /// 放弃本次洗牌，不产生获奖者
    pub fn abandon_cycle(&mut self) {
        if self.phase == DrawPhase::Cycling {
            debug!("洗牌被中断，本次不产生获奖者");
        }
        self.phase = DrawPhase::Idle;
    }

    /// 带洗牌动画的抽奖
    ///
    /// 每个间隔调用一次 `on_tick` 展示随机人选，结束后提交最终结果。
    /// 若 future 在中途被丢弃，不会提交任何获奖者，引擎回到 `Idle`。
    pub async fn draw_with_cycle<R, F>(
        &mut self,
        rng: &mut R,
        schedule: &CycleSchedule,
        mut on_tick: F,
    ) -> Result<Candidate, DrawError>
    where
        R: Rng + ?Sized,
        F: FnMut(&Candidate),
    {
        self.begin_cycle()?;
        let mut guard = CycleGuard { engine: self };

        let interval = schedule.interval();
        for _ in 0..schedule.ticks {
            tokio::time::sleep(interval).await;
            if let Some(shown) = guard.engine.preview(rng) {
                on_tick(&shown);
            }
        }

        guard.engine.finish_cycle(rng)
    }

    /// 清除中奖记录（二次确认）
    ///
    /// 第一次调用只进入待确认状态；确认窗口内再次调用才会清除记录和当前获奖者
    pub fn reset_history(&mut self) -> GateOutcome {
        self.reset_history_at(Instant::now())
    }

    pub fn reset_history_at(&mut self, now: Instant) -> GateOutcome {
        let outcome = self.reset_gate.trigger_at(now);
        if outcome == GateOutcome::Confirmed {
            info!("🗑️ 已清除 {} 条中奖记录", self.history.len());
            self.history.clear();
            self.current_winner = None;
        }
        outcome
    }

    pub fn is_reset_armed(&self) -> bool {
        self.reset_gate.is_armed()
    }

    /// 名单被清空时调用：清除记录、当前获奖者和待确认状态
    pub fn clear(&mut self) {
        self.pool.clear();
        self.history.clear();
        self.current_winner = None;
        self.reset_gate.disarm();
    }

    fn ensure_ready(&self) -> Result<(), DrawError> {
        if self.phase == DrawPhase::Cycling {
            return Err(DrawError::DrawInProgress);
        }
        if self.remaining() == 0 {
            return Err(DrawError::EmptyPool);
        }
        Ok(())
    }

    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Candidate> {
        let eligible = self.eligible();
        if eligible.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..eligible.len());
        Some(eligible[index].clone())
    }

    fn commit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Candidate, DrawError> {
        let winner = self.pick(rng).ok_or(DrawError::EmptyPool)?;
        self.history.push_front(winner.clone());
        self.current_winner = Some(winner.clone());
        Ok(winner)
    }
}

/// 洗牌期间持有引擎；被丢弃时恢复到 `Idle`
struct CycleGuard<'a> {
    engine: &'a mut DrawEngine,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.engine.abandon_cycle();
    }
}
