/// Configuration schema and defaults for predsweep.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[endpoint]`, `[sweep]`, `[gallery]`, `[logging]`, and `[web]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level predsweep configuration.
///
/// Maps directly to the `~/.predsweep/config.toml` and `.predsweep.toml`
/// file schemas. All sections and fields are optional — missing values fall
/// back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub endpoint: EndpointConfig,
    pub sweep: SweepSection,
    pub gallery: GalleryConfig,
    pub logging: LoggingConfig,
    pub web: WebConfig,
}

// ---------------------------------------------------------------------------
// [endpoint]
// ---------------------------------------------------------------------------

/// Prediction service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL of the prediction service.
    pub url: String,
    /// Timeout for a single prediction request (milliseconds).
    pub timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [sweep]
// ---------------------------------------------------------------------------

/// Sweep loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSection {
    /// Number of samples in the evaluation dataset. The sweep stops once
    /// the index reaches this bound.
    pub total_samples: u64,
    /// Target tick cadence (milliseconds). A tick begins only after the
    /// previous step has completed; the loop sleeps for whatever remains of
    /// the interval after the step's own latency.
    pub interval_ms: u64,
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            // Full MNIST: 60k train + 10k test samples.
            total_samples: 70_000,
            interval_ms: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// [gallery]
// ---------------------------------------------------------------------------

/// Miss gallery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Directory where downloaded miss images are stored. `~` is expanded
    /// to the home directory.
    pub dir: String,
    /// Whether to download miss images from the service. When `false`, only
    /// the `/static/images/incorrect_<id>.png` references are kept.
    pub download: bool,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            dir: "~/.predsweep/misses".to_string(),
            download: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Step logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether step logging is enabled.
    pub enabled: bool,
    /// Path to the step log file. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.predsweep/step-log.jsonl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Web dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `predsweep web`.
    pub addr: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9316".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl SweepConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `predsweep config init` to create a starting config file
    /// with all settings documented.
    pub fn default_toml() -> String {
        r#"# predsweep Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (PREDSWEEP_*)
#   2. Project config (.predsweep.toml in current directory)
#   3. User global config (~/.predsweep/config.toml)
#   4. Built-in defaults

[endpoint]
url = "http://127.0.0.1:5000"
timeout_ms = 10000

[sweep]
total_samples = 70000   # Full MNIST dataset
interval_ms = 10        # Target tick cadence; steps are serialized

[gallery]
dir = "~/.predsweep/misses"
download = true         # Fetch miss images from the service

[logging]
enabled = true
path = "~/.predsweep/step-log.jsonl"

[web]
addr = "127.0.0.1:9316"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = SweepConfig::default();
        assert_eq!(config.endpoint.url, "http://127.0.0.1:5000");
        assert_eq!(config.endpoint.timeout_ms, 10_000);
        assert_eq!(config.sweep.total_samples, 70_000);
        assert_eq!(config.sweep.interval_ms, 10);
        assert!(config.gallery.download);
        assert!(config.logging.enabled);
        assert_eq!(config.web.addr, "127.0.0.1:9316");
    }

    #[test]
    fn deserialize_minimal_toml() {
        let toml_str = r#"
[sweep]
total_samples = 100
"#;
        let config: SweepConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sweep.total_samples, 100);
        // All other sections fall back to defaults
        assert_eq!(config.sweep.interval_ms, 10);
        assert_eq!(config.endpoint.url, "http://127.0.0.1:5000");
    }

    #[test]
    fn deserialize_full_toml() {
        let toml_str = r#"
[endpoint]
url = "http://10.0.0.7:8080"
timeout_ms = 2000

[sweep]
total_samples = 500
interval_ms = 25

[gallery]
dir = "/tmp/misses"
download = false

[logging]
enabled = false
path = "/tmp/steps.jsonl"

[web]
addr = "0.0.0.0:8000"
"#;
        let config: SweepConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.endpoint.url, "http://10.0.0.7:8080");
        assert_eq!(config.endpoint.timeout_ms, 2000);
        assert_eq!(config.sweep.total_samples, 500);
        assert_eq!(config.sweep.interval_ms, 25);
        assert_eq!(config.gallery.dir, "/tmp/misses");
        assert!(!config.gallery.download);
        assert!(!config.logging.enabled);
        assert_eq!(config.web.addr, "0.0.0.0:8000");
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: SweepConfig = toml::from_str("").unwrap();
        assert_eq!(config.sweep.total_samples, 70_000);
        assert!(config.gallery.download);
    }

    #[test]
    fn default_toml_parses_back() {
        let toml_str = SweepConfig::default_toml();
        let config: SweepConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.sweep.total_samples, 70_000);
        assert_eq!(config.sweep.interval_ms, 10);
    }
}
