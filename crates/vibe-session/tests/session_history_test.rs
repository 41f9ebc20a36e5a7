//! Session + durable history across process restarts.

use std::sync::Arc;

use vibe_core::{defaults, GenerationBackend, SelectedFile};
use vibe_inference::mock::MockGenerationBackend;
use vibe_inference::AnalysisClient;
use vibe_session::{demo_report, HistoryStore, SessionConfig, SessionController, SessionState};

fn report_json(vibe: &str) -> String {
    let mut value = serde_json::to_value(demo_report()).unwrap();
    value["locationVibe"] = serde_json::Value::String(vibe.to_string());
    value.to_string()
}

fn open(dir: &std::path::Path, primary: &MockGenerationBackend) -> SessionController {
    let config = SessionConfig::default().with_history_dir(dir);
    let history = HistoryStore::load(config.history_storage());
    let client = AnalysisClient::new(
        Arc::new(primary.clone()) as Arc<dyn GenerationBackend>,
        None,
        defaults::THINKING_BUDGET,
    );
    SessionController::new(config, history, Some(Arc::new(client)))
}

fn photo() -> SelectedFile {
    SelectedFile::new(
        "street.png",
        None,
        vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3],
    )
}

#[tokio::test]
async fn test_history_is_capped_and_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut primary = MockGenerationBackend::new("pro");
    for n in 1..=7 {
        primary = primary.then_text(report_json(&format!("Scan {}", n)));
    }

    let mut session = open(dir.path(), &primary);
    for _ in 0..7 {
        session.reset();
        session.select(photo()).unwrap();
        assert_eq!(session.analyze().await, SessionState::Complete);
    }
    assert_eq!(session.history().len(), defaults::HISTORY_CAPACITY);

    let stored = std::fs::read_to_string(dir.path().join(defaults::HISTORY_FILE_NAME)).unwrap();
    let raw: Vec<serde_json::Value> = serde_json::from_str(&stored).unwrap();
    assert_eq!(raw.len(), 5);
    assert_eq!(raw[0]["report"]["locationVibe"], "Scan 7");
    assert!(raw[0]["thumbnail"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));

    drop(session);
    let mut reopened = open(dir.path(), &MockGenerationBackend::new("pro"));
    let vibes: Vec<&str> = reopened
        .history()
        .entries()
        .iter()
        .map(|e| e.report.location_vibe.as_str())
        .collect();
    assert_eq!(vibes, vec!["Scan 7", "Scan 6", "Scan 5", "Scan 4", "Scan 3"]);

    let oldest = reopened.history().entries()[4].id.clone();
    reopened.load_from_history(&oldest).unwrap();
    assert_eq!(reopened.state(), SessionState::Complete);
    assert_eq!(reopened.report().unwrap().location_vibe, "Scan 3");
}

#[tokio::test]
async fn test_corrupt_history_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(defaults::HISTORY_FILE_NAME), "{not json").unwrap();

    let primary = MockGenerationBackend::new("pro").then_text(report_json("Fresh"));
    let mut session = open(dir.path(), &primary);
    assert!(session.history().is_empty());

    session.select(photo()).unwrap();
    session.analyze().await;
    assert_eq!(session.history().len(), 1);
}
