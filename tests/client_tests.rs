/// Wire-contract tests for the prediction service client.
///
/// The service is not contacted: these pin down the request/response shapes
/// and URL derivations the sweep depends on.
use predsweep::client::{PredictClient, Prediction, ResetAck};
use predsweep::client::predict::PredictRequest;
use predsweep::config::schema::EndpointConfig;
use predsweep::error::StepError;
use predsweep::gallery;

fn endpoint(url: &str) -> EndpointConfig {
    EndpointConfig {
        url: url.to_string(),
        ..EndpointConfig::default()
    }
}

// ---------------------------------------------------------------------------
// URL derivation
// ---------------------------------------------------------------------------

#[test]
fn base_url_trailing_slash_is_normalized() {
    let client = PredictClient::from_config(&endpoint("http://127.0.0.1:5000/"));
    assert_eq!(client.base_url(), "http://127.0.0.1:5000");
}

#[test]
fn miss_image_url_matches_the_static_asset_convention() {
    let client = PredictClient::from_config(&endpoint("http://127.0.0.1:5000"));
    assert_eq!(
        client.miss_image_url(7),
        "http://127.0.0.1:5000/static/images/incorrect_7.png"
    );
    // The gallery derives the same path, service-relative.
    assert_eq!(gallery::remote_path(7), "/static/images/incorrect_7.png");
}

// ---------------------------------------------------------------------------
// Request / response shapes
// ---------------------------------------------------------------------------

#[test]
fn predict_request_carries_only_the_index() {
    let body = serde_json::to_value(PredictRequest { index: 69_999 }).unwrap();
    assert_eq!(body, serde_json::json!({ "index": 69999 }));
}

#[test]
fn prediction_decodes_counts_only() {
    let p: Prediction = serde_json::from_str(r#"{"correct": 12, "incorrect": 4}"#).unwrap();
    assert_eq!(p.correct, 12);
    assert_eq!(p.incorrect, 4);
    assert!(p.prediction.is_none());
    assert!(p.true_label.is_none());
    assert!(p.is_incorrect.is_none());
}

#[test]
fn prediction_decodes_the_full_service_payload() {
    let json = r#"{
        "prediction": 3,
        "true_label": 5,
        "correct": 99,
        "incorrect": 7,
        "is_incorrect": true
    }"#;
    let p: Prediction = serde_json::from_str(json).unwrap();
    assert_eq!((p.correct, p.incorrect), (99, 7));
    assert_eq!(p.prediction, Some(3));
    assert_eq!(p.true_label, Some(5));
    assert_eq!(p.is_incorrect, Some(true));
}

#[test]
fn reset_ack_decodes_the_service_payload() {
    let json = r#"{"message": "Testing has been reset.", "correct": 0, "incorrect": 0}"#;
    let ack: ResetAck = serde_json::from_str(json).unwrap();
    assert_eq!(ack.message, "Testing has been reset.");
    assert_eq!(ack.correct, 0);
    assert_eq!(ack.incorrect, 0);
}

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

#[test]
fn step_error_labels_match_the_log_vocabulary() {
    assert_eq!(StepError::RequestFailed { status: 502 }.label(), "request-failed");
    assert_eq!(
        StepError::Transport("connection refused".into()).label(),
        "unreachable"
    );
    assert_eq!(StepError::DecodeFailed("eof".into()).label(), "decode-failed");
}
