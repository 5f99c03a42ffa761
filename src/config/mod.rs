/// Configuration system for predsweep.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::SweepConfig::default()`]
/// 2. **User global config** — `~/.predsweep/config.toml`
/// 3. **Project local config** — `.predsweep.toml` in the current working directory
/// 4. **Environment variables** — `PREDSWEEP_*` overrides (highest precedence)
///
/// Later layers override earlier ones. Missing sections in a TOML file fall
/// back to the previous layer's values.
///
/// # Usage
///
/// ```rust,ignore
/// use predsweep::config;
///
/// let cfg = config::load();
/// println!("sweeping {} samples", cfg.sweep.total_samples);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::SweepConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved predsweep configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. This is the primary entry point for all modules that need
/// configuration.
pub fn load() -> SweepConfig {
    let mut config = SweepConfig::default();

    // Layer 2: user global config (~/.predsweep/config.toml)
    if let Some(global) = load_toml_file(global_config_path()) {
        merge_config(&mut config, &global);
    }

    // Layer 3: project local config (.predsweep.toml)
    if let Some(project) = load_toml_file(project_config_path()) {
        merge_config(&mut config, &project);
    }

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. A malformed file is ignored rather than aborting
/// the sweep.
fn load_toml_file(path: Option<PathBuf>) -> Option<SweepConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge a loaded config layer into the base config.
///
/// Each TOML file is deserialized with `serde(default)`, so unset keys in
/// the overlay already carry the built-in defaults — replacing the base
/// wholesale applies exactly the explicitly-set values.
fn merge_config(base: &mut SweepConfig, overlay: &SweepConfig) {
    *base = overlay.clone();
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.predsweep/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".predsweep").join("config.toml"))
}

/// Path to the project local config: `.predsweep.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".predsweep.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~` in a configured path to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `PREDSWEEP_ENDPOINT_URL` — prediction service base URL
/// - `PREDSWEEP_ENDPOINT_TIMEOUT_MS` — request timeout
/// - `PREDSWEEP_TOTAL_SAMPLES` — dataset size bound
/// - `PREDSWEEP_INTERVAL_MS` — tick cadence
/// - `PREDSWEEP_GALLERY_DIR` — miss image directory
/// - `PREDSWEEP_GALLERY_DOWNLOAD` — download toggle (`1`/`true`/`yes`/`on`)
/// - `PREDSWEEP_LOGGING` — step logging toggle
/// - `PREDSWEEP_LOG_PATH` — step log path
/// - `PREDSWEEP_WEB_ADDR` — dashboard listen address
fn apply_env_overrides(config: &mut SweepConfig) {
    if let Ok(val) = std::env::var("PREDSWEEP_ENDPOINT_URL")
        && !val.is_empty()
    {
        config.endpoint.url = val;
    }
    if let Ok(val) = std::env::var("PREDSWEEP_ENDPOINT_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.endpoint.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("PREDSWEEP_TOTAL_SAMPLES")
        && let Ok(n) = val.parse::<u64>()
    {
        config.sweep.total_samples = n;
    }
    if let Ok(val) = std::env::var("PREDSWEEP_INTERVAL_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.sweep.interval_ms = ms;
    }
    if let Ok(val) = std::env::var("PREDSWEEP_GALLERY_DIR")
        && !val.is_empty()
    {
        config.gallery.dir = val;
    }
    if let Ok(val) = std::env::var("PREDSWEEP_GALLERY_DOWNLOAD") {
        config.gallery.download = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("PREDSWEEP_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("PREDSWEEP_LOG_PATH")
        && !val.is_empty()
    {
        config.logging.path = val;
    }
    if let Ok(val) = std::env::var("PREDSWEEP_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.predsweep/config.toml`.
///
/// Creates the `~/.predsweep/` directory if it doesn't exist. Returns an
/// error if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.predsweep/ directory")?;
    }

    fs::write(&path, SweepConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified key,
/// and writes the result back. Supports dotted keys like `sweep.interval_ms`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let toml_str = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&SweepConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&toml_str).context("failed to parse config as TOML value")?;

    set_toml_value(&mut value_table, key, value)?;

    let output =
        toml::to_string_pretty(&value_table).context("failed to serialize updated config")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.is_empty() {
        anyhow::bail!("empty config key");
    }

    // Navigate to the parent table
    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    // Determine the type of the existing value to parse correctly
    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let existing = table.get(leaf);
    let new_value = match existing {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn expand_home_passes_absolute_paths_through() {
        assert_eq!(expand_home("/tmp/steps.jsonl"), PathBuf::from("/tmp/steps.jsonl"));
    }

    #[test]
    fn expand_home_expands_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/x.jsonl"), home.join("x.jsonl"));
        }
    }

    #[test]
    fn set_toml_value_updates_string() {
        let toml_str = r#"
[endpoint]
url = "http://127.0.0.1:5000"
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "endpoint.url", "http://10.0.0.7:8080").unwrap();

        let table = root.as_table().unwrap();
        let endpoint = table["endpoint"].as_table().unwrap();
        assert_eq!(endpoint["url"].as_str(), Some("http://10.0.0.7:8080"));
    }

    #[test]
    fn set_toml_value_updates_bool() {
        let toml_str = r#"
[gallery]
download = true
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "gallery.download", "false").unwrap();

        let table = root.as_table().unwrap();
        let gallery = table["gallery"].as_table().unwrap();
        assert_eq!(gallery["download"].as_bool(), Some(false));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let toml_str = r#"
[sweep]
interval_ms = 10
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "sweep.interval_ms", "50").unwrap();

        let table = root.as_table().unwrap();
        let sweep = table["sweep"].as_table().unwrap();
        assert_eq!(sweep["interval_ms"].as_integer(), Some(50));
    }

    #[test]
    fn set_toml_value_rejects_invalid_key() {
        let toml_str = r#"
[sweep]
interval_ms = 10
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        let result = set_toml_value(&mut root, "nonexistent.key", "value");
        assert!(result.is_err());
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let result = show_effective_config();
        assert!(result.is_ok());
        let toml_str = result.unwrap();
        // Should be parseable back
        let _: SweepConfig = toml::from_str(&toml_str).unwrap();
    }
}
