//! Wire types and the concrete `ureq`-backed prediction client.

use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::Predictor;
use crate::config::schema::EndpointConfig;
use crate::error::StepError;

// ---------------------------------------------------------------------------
// Request / response types for the prediction API
// ---------------------------------------------------------------------------

/// Request body for `POST /predict`.
#[derive(Debug, Serialize)]
pub struct PredictRequest {
    pub index: u64,
}

/// Response body from `POST /predict`.
///
/// `correct` and `incorrect` are the service's running counts. `incorrect`
/// doubles as the identifier of the newest miss image — the service names
/// stored images after this counter, so the overload is preserved on the
/// wire. The remaining fields are supplementary and may be absent.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub correct: u64,
    pub incorrect: u64,
    /// Label the model predicted for this sample.
    #[serde(default)]
    pub prediction: Option<i64>,
    /// Ground-truth label for this sample.
    #[serde(default)]
    pub true_label: Option<i64>,
    /// Whether this particular sample was misclassified.
    #[serde(default)]
    pub is_incorrect: Option<bool>,
}

/// Response body from `POST /reset`.
#[derive(Debug, Deserialize)]
pub struct ResetAck {
    pub message: String,
    pub correct: u64,
    pub incorrect: u64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous prediction service client.
///
/// Created from the resolved [`EndpointConfig`] and reused for the lifetime
/// of a single sweep.
#[derive(Debug)]
pub struct PredictClient {
    base_url: String,
    timeout: Duration,
}

impl PredictClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &EndpointConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Base URL of the service, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Derived URL of the miss image identified by `id`.
    pub fn miss_image_url(&self, id: u64) -> String {
        format!("{}/static/images/incorrect_{id}.png", self.base_url)
    }

    /// Check whether the service is reachable.
    ///
    /// Uses a short timeout (5 s) so `predsweep health` doesn't stall when
    /// the service is down. Any HTTP response — including an error status —
    /// counts as reachable.
    pub fn is_healthy(&self) -> bool {
        let result = ureq::get(&self.base_url)
            .timeout(Duration::from_secs(5))
            .call();

        match result {
            Ok(_) => true,
            Err(ureq::Error::Status(_, _)) => true,
            Err(_) => false,
        }
    }

    /// Zero the service-side counters and delete its stored miss images.
    pub fn reset(&self) -> Result<ResetAck> {
        let url = format!("{}/reset", self.base_url);

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(serde_json::json!({}))
            .context("reset request failed")?;

        resp.into_json()
            .context("failed to parse reset response")
    }
}

impl Predictor for PredictClient {
    fn predict(&mut self, index: u64) -> Result<Prediction, StepError> {
        let url = format!("{}/predict", self.base_url);

        let result = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(&PredictRequest { index });

        let resp = match result {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, _)) => {
                return Err(StepError::RequestFailed { status });
            }
            Err(err) => return Err(StepError::Transport(err.to_string())),
        };

        resp.into_json()
            .map_err(|err| StepError::DecodeFailed(err.to_string()))
    }

    fn fetch_miss_image(&mut self, id: u64) -> Result<Vec<u8>, StepError> {
        let url = self.miss_image_url(id);

        let result = ureq::get(&url).timeout(self.timeout).call();

        let resp = match result {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, _)) => {
                return Err(StepError::RequestFailed { status });
            }
            Err(err) => return Err(StepError::Transport(err.to_string())),
        };

        let mut bytes = Vec::new();
        resp.into_reader()
            .read_to_end(&mut bytes)
            .map_err(|err| StepError::DecodeFailed(err.to_string()))?;

        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_default_config() {
        let config = EndpointConfig::default();
        let client = PredictClient::from_config(&config);
        assert_eq!(client.base_url, "http://127.0.0.1:5000");
        assert_eq!(client.timeout, Duration::from_millis(10_000));
    }

    #[test]
    fn client_strips_trailing_slash() {
        let config = EndpointConfig {
            url: "http://127.0.0.1:5000/".to_string(),
            ..EndpointConfig::default()
        };
        let client = PredictClient::from_config(&config);
        assert_eq!(client.base_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn miss_image_url_follows_static_convention() {
        let client = PredictClient::from_config(&EndpointConfig::default());
        assert_eq!(
            client.miss_image_url(3),
            "http://127.0.0.1:5000/static/images/incorrect_3.png"
        );
    }

    #[test]
    fn predict_request_serializes_index_only() {
        let body = serde_json::to_string(&PredictRequest { index: 42 }).unwrap();
        assert_eq!(body, r#"{"index":42}"#);
    }

    #[test]
    fn prediction_decodes_minimal_payload() {
        let p: Prediction = serde_json::from_str(r#"{"correct": 5, "incorrect": 0}"#).unwrap();
        assert_eq!(p.correct, 5);
        assert_eq!(p.incorrect, 0);
        assert!(p.prediction.is_none());
        assert!(p.is_incorrect.is_none());
    }

    #[test]
    fn prediction_decodes_full_service_payload() {
        let json = r#"{
            "prediction": 7,
            "true_label": 1,
            "correct": 40,
            "incorrect": 3,
            "is_incorrect": true
        }"#;
        let p: Prediction = serde_json::from_str(json).unwrap();
        assert_eq!(p.correct, 40);
        assert_eq!(p.incorrect, 3);
        assert_eq!(p.prediction, Some(7));
        assert_eq!(p.true_label, Some(1));
        assert_eq!(p.is_incorrect, Some(true));
    }
}
