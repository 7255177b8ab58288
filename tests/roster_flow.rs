use rand::rngs::StdRng;
use rand::SeedableRng;
use roster_draw::error::LlmError;
use roster_draw::services::duplicate_analyzer::analyze;
use roster_draw::services::group_partitioner::partition;
use roster_draw::services::name_parser::parse_names;
use roster_draw::services::{deduplicator, CsvExporter, DrawEngine, NameAssistant};
use roster_draw::{CleanOutcome, Config, DrawError, GateOutcome, NamingOutcome, RosterSession};

/// 固定回复的助手，不访问网络
struct OfflineAssistant {
    cleaned: Vec<String>,
    fail_naming: bool,
}

impl NameAssistant for OfflineAssistant {
    async fn clean_names(&self, _raw_text: &str) -> Result<Vec<String>, LlmError> {
        Ok(self.cleaned.clone())
    }

    async fn transcribe_audio(
        &self,
        _audio: &[u8],
        mime_type: &str,
    ) -> Result<Vec<String>, LlmError> {
        Err(LlmError::UnsupportedAudioFormat {
            mime_type: mime_type.to_string(),
        })
    }

    async fn name_groups(&self, groups: &[Vec<String>]) -> Result<Vec<String>, LlmError> {
        if self.fail_naming {
            return Err(LlmError::MissingApiKey);
        }
        Ok((0..groups.len()).map(|i| format!("Team {}", i + 1)).collect())
    }
}

#[test]
fn test_parse_analyze_and_dedup() {
    let people = parse_names("A, B\nA,,C\n");
    let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "A", "C"]);

    let report = analyze(&people);
    assert_eq!(report.total, 4);
    assert_eq!(report.unique_count, 3);
    assert_eq!(report.duplicate_count, 1);
    assert!(report.is_duplicate("A"));

    let unique = deduplicator::dedup(&people);
    assert_eq!(deduplicator::to_text(&unique), "A\nB\nC");
}

#[test]
fn test_draw_exhausts_pool() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut engine = DrawEngine::new(parse_names("A,B,C,D,E"));

    let mut winners: Vec<String> = (0..5)
        .map(|_| engine.draw(&mut rng).unwrap().name)
        .collect();
    winners.sort();
    assert_eq!(winners, vec!["A", "B", "C", "D", "E"]);

    assert_eq!(engine.draw(&mut rng), Err(DrawError::EmptyPool));
    assert_eq!(engine.history().len(), 5);
}

#[test]
fn test_partition_ten_in_fours() {
    let mut rng = StdRng::seed_from_u64(3);
    let groups = partition(&parse_names("1,2,3,4,5,6,7,8,9,10"), 4, &mut rng);

    let sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
    assert_eq!(sizes, vec![4, 4, 2]);
    assert_eq!(groups[2].name, "Group 3");
}

#[tokio::test]
async fn test_session_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let roster_path = dir.path().join("names.csv");
    tokio::fs::write(&roster_path, "张三,李四\n王五\n张三\n赵六\n孙七\n")
        .await
        .unwrap();

    let mut rng = StdRng::seed_from_u64(42);
    let mut session = RosterSession::new(&Config::default());

    let report = session.load_file(&roster_path).await.unwrap();
    assert_eq!(report.duplicate_count, 1);

    assert_eq!(session.remove_duplicates(), 1);
    assert_eq!(session.people().len(), 5);

    let winner = session.draw(&mut rng).unwrap();
    assert_eq!(session.draw_engine().remaining(), 4);
    assert_eq!(session.draw_engine().current_winner(), Some(&winner));

    session.set_group_size_input("2");
    session.generate_groups(&mut rng);
    assert_eq!(session.groups().len(), 3);

    let assistant = OfflineAssistant {
        cleaned: Vec::new(),
        fail_naming: false,
    };
    let outcome = session.ai_name_groups(&assistant).await.unwrap();
    assert_eq!(outcome, NamingOutcome::Renamed { count: 3 });
    assert_eq!(session.groups()[0].name, "Team 1");

    let export_path = dir.path().join("groups_result.csv");
    let rows = session
        .export_groups(&CsvExporter::with_path(&export_path))
        .await
        .unwrap();
    assert_eq!(rows, 5);

    let bytes = tokio::fs::read(&export_path).await.unwrap();
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    let content = String::from_utf8(bytes).unwrap();
    let mut lines = content.trim_start_matches('\u{feff}').lines();
    assert_eq!(lines.next(), Some("GroupName,Name,ID"));
    assert_eq!(lines.count(), 5);
}

#[tokio::test]
async fn test_session_ai_fallbacks() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut session = RosterSession::new(&Config::default());
    session.set_raw_input("姓名\n甲\n乙\n丙");

    let assistant = OfflineAssistant {
        cleaned: vec!["甲".into(), "乙".into(), "丙".into()],
        fail_naming: true,
    };
    let outcome = session.ai_clean(&assistant).await.unwrap();
    assert_eq!(outcome, CleanOutcome::Cleaned { count: 3 });
    assert_eq!(session.raw_input(), "甲\n乙\n丙");

    let err = session.transcribe(&assistant, b"RIFF", "audio/webm").await;
    assert!(err.is_err());
    assert_eq!(session.people().len(), 3);

    session.set_group_size(2);
    session.generate_groups(&mut rng);
    let outcome = session.ai_name_groups(&assistant).await.unwrap();
    assert!(matches!(outcome, NamingOutcome::FellBack { .. }));
    assert_eq!(session.groups()[0].name, "Group 1");
    assert_eq!(session.groups()[1].name, "Group 2");
}

#[test]
fn test_clear_requires_confirmation() {
    let mut session = RosterSession::new(&Config::default());
    session.load_mock();
    assert!(!session.people().is_empty());

    assert_eq!(session.clear_all(), GateOutcome::Armed);
    assert!(!session.people().is_empty());

    assert_eq!(session.clear_all(), GateOutcome::Confirmed);
    assert!(session.people().is_empty());
    assert!(session.raw_input().is_empty());
}
