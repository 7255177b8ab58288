//! 名单会话 - 流程层
//!
//! 核心职责：持有一次会话的全部状态，并定义每种操作对状态的影响
//!
//! - 名单（原始文本 + 候选人列表 + 重复统计）每次解析都整体替换
//! - 中奖记录与分组是独立状态，只有显式操作或清空名单才会重置
//! - AI 调用失败只产生提示，不会破坏已有状态（名单整理失败时按普通规则拆分）

use std::collections::HashSet;
use std::fmt::Display;
use std::path::Path;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppResult, DrawError, LlmError};
use crate::infrastructure::{ActionTicket, ActionTracker, ConfirmGate, GateOutcome};
use crate::models::{load_roster_text, Candidate, Group, MOCK_ROSTER};
use crate::services::duplicate_analyzer::{analyze, DuplicateReport};
use crate::services::group_partitioner::{apply_group_names, parse_group_size, partition};
use crate::services::name_parser::{parse_names, split_names};
use crate::services::{deduplicator, CsvExporter, CycleSchedule, DrawEngine, NameAssistant};

/// 需要调用 AI 的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiAction {
    CleanNames,
    TranscribeAudio,
    NameGroups,
}

impl Display for AiAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AiAction::CleanNames => "AI 智能格式化",
            AiAction::TranscribeAudio => "语音录入",
            AiAction::NameGroups => "AI 生成队名",
        };
        write!(f, "{}", label)
    }
}

/// 名单整理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanOutcome {
    /// 原始文本为空，未调用
    Skipped,
    /// AI 整理成功
    Cleaned { count: usize },
    /// AI 失败，已按换行/逗号拆分
    FellBack { count: usize, reason: String },
}

/// 队名生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingOutcome {
    /// 还没有分组，未调用
    Skipped,
    /// 已替换的组名数量
    Renamed { count: usize },
    /// AI 失败，所有分组恢复默认组名
    FellBack { reason: String },
}

/// 名单会话
pub struct RosterSession {
    raw_input: String,
    people: Vec<Candidate>,
    report: DuplicateReport,
    draw: DrawEngine,
    groups: Vec<Group>,
    group_size: usize,
    clear_gate: ConfirmGate,
    in_flight: ActionTracker<AiAction>,
}

impl RosterSession {
    pub fn new(config: &Config) -> Self {
        Self {
            raw_input: String::new(),
            people: Vec::new(),
            report: DuplicateReport::default(),
            draw: DrawEngine::new(Vec::new()).with_confirm_timeout(config.confirm_timeout()),
            groups: Vec::new(),
            group_size: config.default_group_size.max(1),
            clear_gate: ConfirmGate::new(config.confirm_timeout()),
            in_flight: ActionTracker::new(),
        }
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn people(&self) -> &[Candidate] {
        &self.people
    }

    pub fn report(&self) -> &DuplicateReport {
        &self.report
    }

    pub fn draw_engine(&self) -> &DrawEngine {
        &self.draw
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// 可供界面观察 AI 请求是否进行中
    pub fn in_flight(&self) -> ActionTracker<AiAction> {
        self.in_flight.clone()
    }

    // ========== 名单录入 ==========

    /// 手动编辑文本
    pub fn set_raw_input(&mut self, text: impl Into<String>) -> &DuplicateReport {
        self.raw_input = text.into();
        self.reparse();
        &self.report
    }

    /// 导入 .txt / .csv 文件
    pub async fn load_file(&mut self, path: &Path) -> AppResult<&DuplicateReport> {
        let text = load_roster_text(path).await?;
        Ok(self.set_raw_input(text))
    }

    /// 加载演示名单
    pub fn load_mock(&mut self) -> &DuplicateReport {
        self.set_raw_input(MOCK_ROSTER)
    }

    /// 一键去重
    ///
    /// # 返回
    /// 返回移除的条目数
    pub fn remove_duplicates(&mut self) -> usize {
        let unique = deduplicator::dedup(&self.people);
        let removed = self.people.len() - unique.len();

        self.raw_input = deduplicator::to_text(&unique);
        self.replace_people(unique);

        info!("🧹 去重完成，移除 {} 个重复项", removed);
        removed
    }

    /// 清空名单（二次确认）
    ///
    /// 确认后名单、中奖记录、分组全部清空
    pub fn clear_all(&mut self) -> GateOutcome {
        let outcome = self.clear_gate.trigger();
        if outcome == GateOutcome::Confirmed {
            self.raw_input.clear();
            self.people.clear();
            self.report = DuplicateReport::default();
            self.draw.clear();
            self.groups.clear();
            info!("🗑️ 名单已清空");
        }
        outcome
    }

    // ========== AI 辅助 ==========

    /// AI 智能格式化
    ///
    /// AI 失败时退回到按换行/逗号拆分，结果同样以每行一个名字写回原始文本
    pub async fn ai_clean<A: NameAssistant>(&mut self, assistant: &A) -> AppResult<CleanOutcome> {
        if self.raw_input.trim().is_empty() {
            return Ok(CleanOutcome::Skipped);
        }
        let _ticket = self.begin(AiAction::CleanNames)?;

        let outcome = match assistant.clean_names(&self.raw_input).await {
            Ok(names) => {
                let count = self.apply_names(names);
                info!("🤖 AI 格式化完成，得到 {} 个名字", count);
                CleanOutcome::Cleaned { count }
            }
            Err(e) => {
                warn!("AI 格式化失败，改用普通拆分: {}", e);
                let names = split_names(&self.raw_input);
                let count = self.apply_names(names);
                CleanOutcome::FellBack {
                    count,
                    reason: e.to_string(),
                }
            }
        };
        Ok(outcome)
    }

    /// 语音录入
    ///
    /// 识别出的名字追加到现有名单之后；失败时名单保持不变
    ///
    /// # 返回
    /// 返回识别出的名字数量
    pub async fn transcribe<A: NameAssistant>(
        &mut self,
        assistant: &A,
        audio: &[u8],
        mime_type: &str,
    ) -> AppResult<usize> {
        let _ticket = self.begin(AiAction::TranscribeAudio)?;

        let names = assistant.transcribe_audio(audio, mime_type).await.map_err(|e| {
            warn!("音频转录失败: {}", e);
            e
        })?;
        let added = names.iter().filter(|name| !name.trim().is_empty()).count();

        let merged: Vec<String> = self
            .raw_input
            .split('\n')
            .map(str::to_string)
            .chain(names)
            .filter(|name| !name.trim().is_empty())
            .collect();
        self.set_raw_input(merged.join("\n"));

        info!("🎙️ 语音识别出 {} 个名字", added);
        Ok(added)
    }

    /// AI 生成队名
    ///
    /// 返回的名字按分组下标对齐，缺失的保留原组名；失败时全部恢复默认组名
    pub async fn ai_name_groups<A: NameAssistant>(
        &mut self,
        assistant: &A,
    ) -> AppResult<NamingOutcome> {
        if self.groups.is_empty() {
            return Ok(NamingOutcome::Skipped);
        }
        let _ticket = self.begin(AiAction::NameGroups)?;

        let member_names: Vec<Vec<String>> = self.groups.iter().map(Group::member_names).collect();
        let outcome = match assistant.name_groups(&member_names).await {
            Ok(names) => NamingOutcome::Renamed {
                count: apply_group_names(&mut self.groups, &names),
            },
            Err(e) => {
                warn!("AI 生成队名失败，使用默认组名: {}", e);
                for (index, group) in self.groups.iter_mut().enumerate() {
                    group.name = Group::default_name(index);
                }
                NamingOutcome::FellBack {
                    reason: e.to_string(),
                }
            }
        };
        Ok(outcome)
    }

    // ========== 抽奖 ==========

    pub fn set_allow_repeats(&mut self, allow: bool) {
        self.draw.set_allow_repeats(allow);
    }

    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Candidate, DrawError> {
        self.draw.draw(rng)
    }

    pub async fn draw_with_cycle<R, F>(
        &mut self,
        rng: &mut R,
        schedule: &CycleSchedule,
        on_tick: F,
    ) -> Result<Candidate, DrawError>
    where
        R: Rng + ?Sized,
        F: FnMut(&Candidate),
    {
        self.draw.draw_with_cycle(rng, schedule, on_tick).await
    }

    /// 清除中奖记录（二次确认）
    pub fn reset_history(&mut self) -> GateOutcome {
        self.draw.reset_history()
    }

    // ========== 分组 ==========

    /// 设置每组人数，输入无效时按 1 处理
    pub fn set_group_size_input(&mut self, input: &str) -> usize {
        self.set_group_size(parse_group_size(input))
    }

    pub fn set_group_size(&mut self, size: usize) -> usize {
        self.group_size = size.max(1);
        self.group_size
    }

    /// 生成分组；名单为空时保持原状
    pub fn generate_groups<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &[Group] {
        if self.people.is_empty() {
            return &self.groups;
        }
        self.groups = partition(&self.people, self.group_size, rng);
        debug!(
            "生成 {} 个分组，每组最多 {} 人",
            self.groups.len(),
            self.group_size
        );
        &self.groups
    }

    /// 导出分组结果
    pub async fn export_groups(&self, exporter: &CsvExporter) -> AppResult<usize> {
        exporter.write(&self.groups).await
    }

    // ========== 内部 ==========

    fn begin(&self, action: AiAction) -> Result<ActionTicket<AiAction>, LlmError> {
        self.in_flight
            .try_begin(action)
            .ok_or_else(|| LlmError::ActionInProgress {
                action: action.to_string(),
            })
    }

    /// 用名字列表替换名单（每行一个写回原始文本）
    fn apply_names(&mut self, names: Vec<String>) -> usize {
        self.set_raw_input(names.join("\n"));
        self.people.len()
    }

    fn reparse(&mut self) {
        let people = parse_names(&self.raw_input);
        self.replace_people(people);
    }

    /// 中奖记录与分组只保留仍在新名单中的候选人：
    /// 重新解析会生成新 id，二者随之清空；去重保留原 id，只移除被删掉的条目
    fn replace_people(&mut self, people: Vec<Candidate>) {
        self.report = analyze(&people);
        self.draw.replace_pool(people.clone());
        self.people = people;
        self.prune_groups();
        debug!(
            "名单已更新: {} 人，{} 个不同名字",
            self.report.total, self.report.unique_count
        );
    }

    fn prune_groups(&mut self) {
        if self.groups.is_empty() {
            return;
        }
        let ids: HashSet<&str> = self.people.iter().map(|c| c.id.as_str()).collect();
        for group in &mut self.groups {
            group.members.retain(|m| ids.contains(m.id.as_str()));
        }
        self.groups.retain(|g| !g.is_empty());
    }
}

impl Default for RosterSession {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 按预设结果返回的助手
    #[derive(Default)]
    struct ScriptedAssistant {
        names: Option<Vec<String>>,
    }

    impl ScriptedAssistant {
        fn returning(names: &[&str]) -> Self {
            Self {
                names: Some(names.iter().map(|s| s.to_string()).collect()),
            }
        }

        fn failing() -> Self {
            Self::default()
        }

        fn result(&self) -> Result<Vec<String>, LlmError> {
            self.names.clone().ok_or_else(|| LlmError::EmptyContent {
                model: "scripted".to_string(),
            })
        }
    }

    impl NameAssistant for ScriptedAssistant {
        async fn clean_names(&self, _raw_text: &str) -> Result<Vec<String>, LlmError> {
            self.result()
        }

        async fn transcribe_audio(&self, _audio: &[u8], _mime: &str) -> Result<Vec<String>, LlmError> {
            self.result()
        }

        async fn name_groups(&self, _groups: &[Vec<String>]) -> Result<Vec<String>, LlmError> {
            self.result()
        }
    }

    fn names(session: &RosterSession) -> Vec<&str> {
        session.people().iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_edit_then_dedup() {
        let mut session = RosterSession::default();
        let report = session.set_raw_input("A\nB\nA,C");
        assert_eq!(report.duplicate_count, 1);

        assert_eq!(session.remove_duplicates(), 1);
        assert_eq!(session.raw_input(), "A\nB\nC");
        assert_eq!(names(&session), vec!["A", "B", "C"]);
        assert!(!session.report().has_duplicates());

        // 再次去重不产生变化
        assert_eq!(session.remove_duplicates(), 0);
        assert_eq!(session.raw_input(), "A\nB\nC");
    }

    #[test]
    fn test_mock_roster_has_duplicates() {
        let mut session = RosterSession::default();
        let report = session.load_mock().clone();
        assert_eq!(report.total, 22);
        assert_eq!(report.unique_count, 20);
        assert!(report.is_duplicate("孙三"));
        assert!(report.is_duplicate("李四"));
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = RosterSession::default();
        session.set_raw_input("A,B,C,D");
        session.draw(&mut rng).unwrap();
        session.generate_groups(&mut rng);

        assert_eq!(session.clear_all(), GateOutcome::Armed);
        assert_eq!(session.people().len(), 4);

        assert_eq!(session.clear_all(), GateOutcome::Confirmed);
        assert!(session.people().is_empty());
        assert!(session.raw_input().is_empty());
        assert!(session.groups().is_empty());
        assert!(session.draw_engine().history().is_empty());
    }

    /// 中奖记录和分组里的每个 id 都必须在当前名单中
    fn assert_state_refers_to_roster(session: &RosterSession) {
        let ids: HashSet<&str> = session.people().iter().map(|c| c.id.as_str()).collect();
        assert!(session
            .draw_engine()
            .history()
            .iter()
            .all(|w| ids.contains(w.id.as_str())));
        assert!(session
            .draw_engine()
            .current_winner()
            .map_or(true, |w| ids.contains(w.id.as_str())));
        assert!(session
            .groups()
            .iter()
            .flat_map(|g| &g.members)
            .all(|m| ids.contains(m.id.as_str())));
    }

    #[test]
    fn test_reparse_drops_stale_history_and_groups() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut session = RosterSession::default();
        session.set_raw_input("A");
        session.draw(&mut rng).unwrap();
        session.generate_groups(&mut rng);

        session.set_raw_input("A\nB");
        assert_state_refers_to_roster(&session);
        assert!(session.draw_engine().history().is_empty());
        assert!(session.groups().is_empty());
        assert_eq!(session.draw_engine().remaining(), 2);
    }

    #[test]
    fn test_dedup_keeps_history_and_prunes_groups() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut session = RosterSession::default();
        session.set_raw_input("A,B,A,C,B");
        session.set_allow_repeats(false);
        session.draw(&mut rng).unwrap();
        session.set_group_size(2);
        session.generate_groups(&mut rng);

        let winner = session.draw_engine().history()[0].clone();
        let winner_survives = session.people().iter().find(|c| c.name == winner.name)
            == Some(&winner);

        assert_eq!(session.remove_duplicates(), 2);
        assert_state_refers_to_roster(&session);

        let members: usize = session.groups().iter().map(Group::len).sum();
        assert_eq!(members, 3);
        assert_eq!(session.draw_engine().history().len(), usize::from(winner_survives));
    }

    #[tokio::test]
    async fn test_every_parse_event_keeps_state_consistent() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut session = RosterSession::default();

        let prime = |session: &mut RosterSession, rng: &mut StdRng| {
            session.draw(rng).unwrap();
            session.generate_groups(rng);
        };

        session.load_mock();
        prime(&mut session, &mut rng);
        session.set_raw_input("甲\n乙\n丙");
        assert_state_refers_to_roster(&session);

        prime(&mut session, &mut rng);
        session
            .ai_clean(&ScriptedAssistant::returning(&["甲", "乙"]))
            .await
            .unwrap();
        assert_state_refers_to_roster(&session);

        prime(&mut session, &mut rng);
        session
            .transcribe(&ScriptedAssistant::returning(&["丁"]), b"RIFF", "audio/wav")
            .await
            .unwrap();
        assert_state_refers_to_roster(&session);

        prime(&mut session, &mut rng);
        session.load_mock();
        assert_state_refers_to_roster(&session);
        assert!(session.groups().is_empty());
    }

    #[test]
    fn test_group_size_input_is_clamped() {
        let mut session = RosterSession::default();
        assert_eq!(session.group_size(), 4);
        assert_eq!(session.set_group_size_input("abc"), 1);
        assert_eq!(session.set_group_size_input("3"), 3);
        assert_eq!(session.set_group_size(0), 1);
    }

    #[test]
    fn test_generate_groups_on_empty_roster_is_noop() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = RosterSession::default();
        assert!(session.generate_groups(&mut rng).is_empty());
    }

    #[tokio::test]
    async fn test_ai_clean_replaces_roster() {
        let mut session = RosterSession::default();
        session.set_raw_input("姓名,部门\n张三,研发");

        let outcome = session
            .ai_clean(&ScriptedAssistant::returning(&["张三", "李四"]))
            .await
            .unwrap();

        assert_eq!(outcome, CleanOutcome::Cleaned { count: 2 });
        assert_eq!(session.raw_input(), "张三\n李四");
        assert_eq!(names(&session), vec!["张三", "李四"]);
    }

    #[tokio::test]
    async fn test_ai_clean_falls_back_to_plain_split() {
        let mut session = RosterSession::default();
        session.set_raw_input("张三, 李四\n王五");

        let outcome = session.ai_clean(&ScriptedAssistant::failing()).await.unwrap();

        assert!(matches!(outcome, CleanOutcome::FellBack { count: 3, .. }));
        assert_eq!(session.raw_input(), "张三\n李四\n王五");
    }

    #[tokio::test]
    async fn test_ai_clean_skips_blank_input() {
        let mut session = RosterSession::default();
        let outcome = session
            .ai_clean(&ScriptedAssistant::returning(&["X"]))
            .await
            .unwrap();
        assert_eq!(outcome, CleanOutcome::Skipped);
        assert!(session.people().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_request_is_rejected() {
        let mut session = RosterSession::default();
        session.set_raw_input("张三");

        let tracker = session.in_flight();
        let _pending = tracker.try_begin(AiAction::CleanNames).unwrap();

        let err = session
            .ai_clean(&ScriptedAssistant::returning(&["李四"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::ActionInProgress { .. })));
        assert_eq!(session.raw_input(), "张三");

        // 其他操作不受影响
        assert!(session
            .transcribe(&ScriptedAssistant::returning(&["王五"]), b"RIFF", "audio/wav")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_transcription_appends() {
        let mut session = RosterSession::default();
        session.set_raw_input("张三\n李四");

        let added = session
            .transcribe(&ScriptedAssistant::returning(&["王五", " "]), b"RIFF", "audio/wav")
            .await
            .unwrap();

        assert_eq!(added, 1);
        assert_eq!(session.raw_input(), "张三\n李四\n王五");
        assert!(!session.in_flight().is_busy(AiAction::TranscribeAudio));
    }

    #[tokio::test]
    async fn test_transcription_failure_keeps_roster() {
        let mut session = RosterSession::default();
        session.set_raw_input("张三");

        let result = session
            .transcribe(&ScriptedAssistant::failing(), b"RIFF", "audio/wav")
            .await;

        assert!(result.is_err());
        assert_eq!(session.raw_input(), "张三");
        assert_eq!(session.people().len(), 1);
    }

    #[tokio::test]
    async fn test_group_naming_and_fallback() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut session = RosterSession::default();
        session.set_raw_input("A,B,C,D,E,F,G");
        session.set_group_size(3);
        session.generate_groups(&mut rng);

        let outcome = session
            .ai_name_groups(&ScriptedAssistant::returning(&["火箭队", "  ", "闪电队"]))
            .await
            .unwrap();
        // 空白队名不计入
        assert_eq!(outcome, NamingOutcome::Renamed { count: 2 });
        let labels: Vec<&str> = session.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(labels, vec!["火箭队", "Group 2", "闪电队"]);

        let outcome = session.ai_name_groups(&ScriptedAssistant::failing()).await.unwrap();
        assert!(matches!(outcome, NamingOutcome::FellBack { .. }));
        let labels: Vec<&str> = session.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(labels, vec!["Group 1", "Group 2", "Group 3"]);
    }
}
