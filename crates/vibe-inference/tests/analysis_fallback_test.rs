//! End-to-end fallback tests: AnalysisClient over real HTTP backends.

use vibe_core::{Error, MediaIngest, MediaReference, SelectedFile};
use vibe_inference::{AnalysisClient, FallbackConfig, InferenceConfig, LogoGenerator};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPORT: &str = include_str!("fixtures/report.json");

fn config(server: &MockServer) -> InferenceConfig {
    InferenceConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        primary_model: "pro".to_string(),
        image_model: "image".to_string(),
        timeout_secs: 10,
        fallback: FallbackConfig {
            enabled: true,
            model: "flash".to_string(),
        },
        ..Default::default()
    }
}

fn media() -> MediaReference {
    MediaIngest::new()
        .select(SelectedFile::new(
            "street.png",
            None,
            vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        ))
        .unwrap()
}

fn report_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
}

#[tokio::test]
async fn test_quota_on_primary_uses_secondary() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/pro:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": { "code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(report_body(REPORT)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AnalysisClient::from_config(&config(&mock_server)).unwrap();
    let report = client.analyze(&media(), "ja").await.unwrap();
    assert_eq!(report.location_vibe, "レトロな横丁");
}

#[tokio::test]
async fn test_both_tiers_down_surfaces_primary_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/pro:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": { "code": 429, "message": "pro quota", "status": "RESOURCE_EXHAUSTED" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/flash:generateContent"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": { "code": 500, "message": "flash internal", "status": "INTERNAL" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AnalysisClient::from_config(&config(&mock_server)).unwrap();
    let err = client.analyze(&media(), "English").await.unwrap_err();

    match err {
        Error::Analysis(msg) => {
            assert!(msg.contains("pro quota"), "unexpected message: {}", msg);
            assert!(!msg.contains("flash internal"));
        }
        other => panic!("expected Analysis error, got {}", other),
    }
}

#[tokio::test]
async fn test_fallback_disabled_makes_single_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/pro:generateContent"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(report_body(REPORT)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut cfg = config(&mock_server);
    cfg.fallback.enabled = false;
    let client = AnalysisClient::from_config(&cfg).unwrap();
    assert!(client.analyze(&media(), "English").await.is_err());
}

#[tokio::test]
async fn test_logo_failure_degrades_to_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/image:generateContent"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let logo = LogoGenerator::from_config(&config(&mock_server))
        .unwrap()
        .generate("Analog Listening Bar")
        .await;
    assert_eq!(logo, "");
}
