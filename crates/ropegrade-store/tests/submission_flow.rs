use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset};

use ropegrade_core::catalog::Achievement;
use ropegrade_core::engine::{NoopReporter, SubmissionEngine, SubmissionEngineConfig};
use ropegrade_core::model::{AnswerSheet, AnsweredQuestion, AttemptKind};
use ropegrade_core::traits::AchievementRepository;
use ropegrade_store::{JsonFileStore, MemoryStore};

fn at(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap()
}

fn sheet(
    user: &str,
    kind: AttemptKind,
    correct: usize,
    total: usize,
    start: &str,
    secs: i64,
) -> AnswerSheet {
    let started_at = at(start);
    let answers = (0..total)
        .map(|i| AnsweredQuestion {
            selected: Some(if i < correct { "A" } else { "B" }.to_string()),
            correct: "A".to_string(),
            points: None,
        })
        .collect();
    AnswerSheet {
        user_id: user.to_string(),
        kind,
        started_at,
        submitted_at: started_at + Duration::seconds(secs),
        answers,
    }
}

fn module(n: u32) -> AttemptKind {
    AttemptKind::FinalExam { module: n }
}

fn engine(repo: Arc<dyn AchievementRepository>) -> SubmissionEngine {
    SubmissionEngine::new(repo, SubmissionEngineConfig::default())
}

#[tokio::test]
async fn passing_module_exam_unlocks_module_medal_only() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine(store.clone());

    let outcome = engine
        .submit(&sheet("ana", module(1), 9, 10, "2026-03-01T14:00:00+01:00", 300))
        .await
        .unwrap();

    assert_eq!(outcome.percentage, 90);
    assert_eq!(outcome.new_achievements, vec![Achievement::Module1]);

    let state = store.load("ana").await.unwrap();
    assert!(state.has(Achievement::Module1));
    assert_eq!(state.history.len(), 1);
}

#[tokio::test]
async fn perfect_fast_night_exam_unlocks_four_medals() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine(store.clone());

    let outcome = engine
        .submit(&sheet("ana", module(1), 10, 10, "2026-03-01T02:00:00+01:00", 50))
        .await
        .unwrap();

    let mut unlocked = outcome.new_achievements.clone();
    unlocked.sort();
    let mut expected = vec![
        Achievement::NightWatch,
        Achievement::Flawless,
        Achievement::FastFingers,
        Achievement::Module1,
    ];
    expected.sort();
    assert_eq!(unlocked, expected);
}

#[tokio::test]
async fn perfect_knot_quiz_unlocks_knot_master() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine(store);

    let kind = AttemptKind::MicroQuiz {
        category_id: 7,
        category_name: Some("Čvorovi".to_string()),
    };
    let outcome = engine
        .submit(&sheet("ivo", kind, 5, 5, "2026-03-01T12:00:00+01:00", 600))
        .await
        .unwrap();

    assert_eq!(outcome.new_achievements, vec![Achievement::KnotMaster]);
}

#[tokio::test]
async fn third_module_completes_the_cycle() {
    let store = Arc::new(MemoryStore::new());
    store
        .unlock("mia", &[Achievement::Module1, Achievement::Module2])
        .await
        .unwrap();
    let engine = engine(store.clone());

    let outcome = engine
        .submit(&sheet("mia", module(3), 19, 20, "2026-03-01T10:00:00+01:00", 900))
        .await
        .unwrap();

    assert_eq!(outcome.percentage, 95);
    assert_eq!(
        outcome.new_achievements,
        vec![Achievement::Module3, Achievement::FullCycle]
    );
    let state = store.load("mia").await.unwrap();
    assert!(state.has(Achievement::FullCycle));
}

#[tokio::test]
async fn repeated_submission_does_not_unlock_twice() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine(store.clone());
    let s = sheet("ana", module(2), 10, 10, "2026-03-01T15:00:00+01:00", 600);

    let first = engine.submit(&s).await.unwrap();
    let second = engine.submit(&s).await.unwrap();

    assert!(first.new_achievements.contains(&Achievement::Module2));
    assert!(second.new_achievements.is_empty());
    assert_eq!(store.load("ana").await.unwrap().history.len(), 2);
}

#[tokio::test]
async fn json_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = Arc::new(JsonFileStore::open(dir.path()).unwrap());
        let engine = engine(store);
        engine
            .submit(&sheet("ana", module(1), 10, 10, "2026-03-01T14:00:00+01:00", 600))
            .await
            .unwrap();
        engine
            .submit(&sheet("ana", module(2), 9, 10, "2026-03-02T14:00:00+01:00", 600))
            .await
            .unwrap();
    }

    let store = Arc::new(JsonFileStore::open(dir.path()).unwrap());
    let engine = engine(store.clone());
    let outcome = engine
        .submit(&sheet("ana", module(3), 9, 10, "2026-03-03T14:00:00+01:00", 600))
        .await
        .unwrap();

    assert_eq!(
        outcome.new_achievements,
        vec![Achievement::Module3, Achievement::FullCycle]
    );
    let state = store.load("ana").await.unwrap();
    assert_eq!(state.history.len(), 3);
    assert!(state.has(Achievement::Flawless));
}

#[tokio::test]
async fn batch_keeps_per_user_order_and_collects_failures() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::open(dir.path()).unwrap());
    let engine = engine(store.clone());

    let sheets = vec![
        sheet("ana", module(1), 10, 10, "2026-03-01T14:00:00+01:00", 600),
        sheet("../escape", module(1), 10, 10, "2026-03-01T14:00:00+01:00", 600),
        sheet("ivo", module(1), 5, 10, "2026-03-01T14:00:00+01:00", 600),
        sheet("ana", module(2), 10, 10, "2026-03-01T15:00:00+01:00", 600),
        sheet("ana", module(3), 10, 10, "2026-03-01T16:00:00+01:00", 600),
    ];

    let report = engine.submit_all(&sheets, &NoopReporter).await.unwrap();

    assert_eq!(report.outcomes.len(), 4);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].user_id, "../escape");

    let users: Vec<&str> = report.outcomes.iter().map(|o| o.user_id.as_str()).collect();
    assert_eq!(users, vec!["ana", "ivo", "ana", "ana"]);
    assert!(report.outcomes[3]
        .new_achievements
        .contains(&Achievement::FullCycle));

    let ana = store.load("ana").await.unwrap();
    let targets: Vec<String> = ana.history.iter().map(|h| h.kind.target_key()).collect();
    assert_eq!(targets, vec!["module-1", "module-2", "module-3"]);
}

#[tokio::test]
async fn grant_is_limited_to_admin_medals() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine(store.clone());

    assert!(engine.grant("ana", Achievement::Instructor).await.unwrap());
    assert!(!engine.grant("ana", Achievement::Instructor).await.unwrap());
    assert!(engine.grant("ana", Achievement::Flawless).await.is_err());

    let state = store.load("ana").await.unwrap();
    assert!(state.has(Achievement::Instructor));
    assert!(!state.has(Achievement::Flawless));
}
