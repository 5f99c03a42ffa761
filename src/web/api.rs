//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content. State is read fresh from
//! the step log and gallery directory on every request — the sweep runs in
//! its own process.

use std::fs;
use std::io::Cursor;

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Response, StatusCode};

use crate::analytics::{logger, reporter};
use crate::client::PredictClient;
use crate::config;
use crate::gallery;

use super::{content_type_json, content_type_png, not_found};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Progress API response — the dashboard's chart and completion state.
#[derive(Serialize)]
struct ProgressResponse {
    total_samples: u64,
    samples_done: u64,
    correct: u64,
    incorrect: u64,
    accuracy_pct: f64,
    failed_steps: usize,
    complete: bool,
}

/// Gallery API response.
#[derive(Serialize)]
struct GalleryResponse {
    entries: Vec<GalleryEntryResponse>,
}

#[derive(Serialize)]
struct GalleryEntryResponse {
    id: u64,
    /// Image URL on the prediction service.
    remote_url: String,
    /// Local dashboard URL, present when the image was downloaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    local_url: Option<String>,
}

/// Config API response — the full config as a JSON value + the raw TOML.
#[derive(Serialize)]
struct ConfigResponse {
    config: config::schema::SweepConfig,
    toml_text: String,
}

/// Config update request — a list of key-value pairs.
#[derive(serde::Deserialize)]
struct ConfigUpdateRequest {
    updates: Vec<ConfigKeyValue>,
}

#[derive(serde::Deserialize)]
struct ConfigKeyValue {
    key: String,
    value: String,
}

/// Health API response.
#[derive(Serialize)]
struct HealthResponse {
    endpoint_url: String,
    endpoint_reachable: bool,
    config_exists: bool,
    log_exists: bool,
    gallery_dir_exists: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/progress` — running counts and completion state.
pub fn get_progress() -> Result<Response<Cursor<Vec<u8>>>> {
    let cfg = config::load();
    let progress = reporter::compute_progress(
        &logger::log_path(&cfg.logging),
        cfg.sweep.total_samples,
    );

    let resp = ProgressResponse {
        total_samples: progress.total_samples,
        samples_done: progress.samples_done,
        correct: progress.correct,
        incorrect: progress.incorrect,
        accuracy_pct: progress.accuracy_pct,
        failed_steps: progress.failed_steps,
        complete: progress.complete,
    };

    json_response(&resp)
}

/// `GET /api/gallery` — recorded miss entries.
pub fn get_gallery() -> Result<Response<Cursor<Vec<u8>>>> {
    let cfg = config::load();
    let entries = logger::read_all_entries(&logger::log_path(&cfg.logging));
    let gallery_dir = config::expand_home(&cfg.gallery.dir);
    let base_url = cfg.endpoint.url.trim_end_matches('/');

    let resp = GalleryResponse {
        entries: reporter::recorded_misses(&entries)
            .into_iter()
            .map(|id| {
                let filename = gallery::image_filename(id);
                let local_url = if gallery_dir.join(&filename).is_file() {
                    Some(format!("/gallery/{filename}"))
                } else {
                    None
                };
                GalleryEntryResponse {
                    id,
                    remote_url: format!("{base_url}{}", gallery::remote_path(id)),
                    local_url,
                }
            })
            .collect(),
    };

    json_response(&resp)
}

/// `GET /gallery/<file>` — serve a downloaded miss image.
///
/// Only plain `incorrect_<id>.png` names are served; anything with a path
/// separator is rejected.
pub fn get_gallery_image(name: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Ok(not_found());
    }
    if !(name.starts_with("incorrect_") && name.ends_with(".png")) {
        return Ok(not_found());
    }

    let cfg = config::load();
    let path = config::expand_home(&cfg.gallery.dir).join(name);

    match fs::read(&path) {
        Ok(bytes) => Ok(Response::from_data(bytes)
            .with_header(content_type_png())
            .with_status_code(StatusCode(200))),
        Err(_) => Ok(not_found()),
    }
}

/// `POST /api/reset` — zero the service counters and clear local state.
///
/// The dashboard's counterpart of `predsweep reset`.
pub fn post_reset() -> Result<Response<Cursor<Vec<u8>>>> {
    let cfg = config::load();
    let client = PredictClient::from_config(&cfg.endpoint);

    let ack = client.reset().context("service reset failed")?;

    let gallery_dir = config::expand_home(&cfg.gallery.dir);
    let removed = gallery::clear_directory(&gallery_dir)?;
    logger::truncate_log(&logger::log_path(&cfg.logging))?;

    let result = serde_json::json!({
        "success": true,
        "message": ack.message,
        "correct": ack.correct,
        "incorrect": ack.incorrect,
        "images_removed": removed,
    });

    json_response(&result)
}

/// `GET /api/config` — current effective configuration.
pub fn get_config() -> Result<Response<Cursor<Vec<u8>>>> {
    let cfg = config::load();
    let toml_text = toml::to_string_pretty(&cfg).unwrap_or_default();

    let resp = ConfigResponse {
        config: cfg,
        toml_text,
    };

    json_response(&resp)
}

/// `PUT /api/config` — update configuration keys.
///
/// Expects JSON body: `{ "updates": [{ "key": "sweep.interval_ms", "value": "25" }] }`
pub fn put_config(body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ConfigUpdateRequest =
        serde_json::from_str(body).context("invalid JSON in config update request")?;

    let mut errors: Vec<String> = Vec::new();
    let mut applied: Vec<String> = Vec::new();

    for kv in &req.updates {
        match config::set_config_value(&kv.key, &kv.value) {
            Ok(()) => applied.push(format!("{} = {}", kv.key, kv.value)),
            Err(e) => errors.push(format!("{}: {}", kv.key, e)),
        }
    }

    let result = serde_json::json!({
        "applied": applied,
        "errors": errors,
        "success": errors.is_empty(),
    });

    json_response(&result)
}

/// `POST /api/config/reset` — reset config to defaults.
pub fn post_config_reset() -> Result<Response<Cursor<Vec<u8>>>> {
    config::reset_config().context("failed to reset config")?;

    let result = serde_json::json!({
        "success": true,
        "message": "Configuration reset to defaults",
    });

    json_response(&result)
}

/// `GET /api/health` — system health summary.
pub fn get_health() -> Result<Response<Cursor<Vec<u8>>>> {
    let cfg = config::load();
    let client = PredictClient::from_config(&cfg.endpoint);

    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let log_exists = logger::log_path(&cfg.logging).exists();
    let gallery_dir_exists = config::expand_home(&cfg.gallery.dir).is_dir();

    let resp = HealthResponse {
        endpoint_url: client.base_url().to_string(),
        endpoint_reachable: client.is_healthy(),
        config_exists,
        log_exists,
        gallery_dir_exists,
    };

    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_response_serializes() {
        let resp = ProgressResponse {
            total_samples: 70_000,
            samples_done: 120,
            correct: 110,
            incorrect: 10,
            accuracy_pct: 91.7,
            failed_steps: 2,
            complete: false,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"total_samples\":70000"));
        assert!(json.contains("\"complete\":false"));
    }

    #[test]
    fn gallery_entry_omits_missing_local_url() {
        let entry = GalleryEntryResponse {
            id: 3,
            remote_url: "http://127.0.0.1:5000/static/images/incorrect_3.png".to_string(),
            local_url: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("local_url"));
    }

    #[test]
    fn config_update_request_deserializes() {
        let json = r#"{"updates": [{"key": "sweep.interval_ms", "value": "25"}]}"#;
        let req: ConfigUpdateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.updates.len(), 1);
        assert_eq!(req.updates[0].key, "sweep.interval_ms");
        assert_eq!(req.updates[0].value, "25");
    }

    #[test]
    fn gallery_image_rejects_path_traversal() {
        let resp = get_gallery_image("../secret.png").unwrap();
        assert_eq!(resp.status_code(), StatusCode(404));

        let resp = get_gallery_image("sub/incorrect_1.png").unwrap();
        assert_eq!(resp.status_code(), StatusCode(404));

        let resp = get_gallery_image("notes.txt").unwrap();
        assert_eq!(resp.status_code(), StatusCode(404));
    }
}
