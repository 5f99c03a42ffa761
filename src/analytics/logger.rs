use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;
use crate::config::expand_home;
use crate::tester::{StepOutcome, StepReport};

// ---------------------------------------------------------------------------
// Step log entry (JSONL analytics)
// ---------------------------------------------------------------------------

/// A single entry in the structured step log (`~/.predsweep/step-log.jsonl`).
///
/// One line per step attempt, successful or not. Used by the reporter for
/// aggregation, `predsweep stats`, and the dashboard's progress API. This
/// log is diagnostics, not sweep state — a sweep always starts at index 0
/// regardless of what the log contains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepLogEntry {
    pub timestamp: String,
    /// Index the step attempted.
    pub index: u64,
    /// Outcome label: `"ok"`, `"request-failed"`, `"unreachable"`,
    /// `"decode-failed"`, or `"container-missing"`.
    pub outcome: String,
    /// Running counts from the service (only set for successful steps).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub correct: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub incorrect: Option<u64>,
    pub latency_ms: u64,
    /// Miss id newly recorded by this step, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub new_miss: Option<u64>,
    /// Error description (only set for failed steps).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl StepLogEntry {
    /// Build a log entry from a step report.
    pub fn from_report(report: &StepReport) -> Self {
        let (correct, incorrect, new_miss, error) = match &report.outcome {
            StepOutcome::Advanced {
                correct,
                incorrect,
                new_miss,
                ..
            } => (Some(*correct), Some(*incorrect), *new_miss, None),
            StepOutcome::Failed(err) => (None, None, None, Some(err.to_string())),
        };

        Self {
            timestamp: Utc::now().to_rfc3339(),
            index: report.index,
            outcome: report.outcome.label().to_string(),
            correct,
            incorrect,
            latency_ms: report.latency_ms,
            new_miss,
            error,
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Appending JSONL step logger.
///
/// Best-effort: logging failures never disturb the sweep. A logger built
/// from a disabled config swallows everything.
#[derive(Debug)]
pub struct StepLogger {
    path: Option<PathBuf>,
}

impl StepLogger {
    /// Build a logger from the resolved config.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let path = if config.enabled {
            Some(expand_home(&config.path))
        } else {
            None
        };
        Self { path }
    }

    /// A logger that drops everything.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Append one step report to the log. Failures are silently ignored.
    pub fn log(&self, report: &StepReport) {
        let _ = self.append(&StepLogEntry::from_report(report));
    }

    fn append(&self, entry: &StepLogEntry) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Resolve the step log path from the logging config.
pub fn log_path(config: &LoggingConfig) -> PathBuf {
    expand_home(&config.path)
}

/// Read all step log entries from the given path.
///
/// Silently skips malformed lines. Returns an empty vec if the file does
/// not exist or cannot be read.
pub fn read_all_entries(path: &Path) -> Vec<StepLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    let reader = BufReader::new(file);
    reader
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<StepLogEntry>(&line).ok())
        .collect()
}

/// Read log entries filtered to a time window (last N days).
///
/// If `days` is `None`, returns all entries.
pub fn read_entries_since_days(path: &Path, days: Option<u32>) -> Vec<StepLogEntry> {
    let entries = read_all_entries(path);

    let Some(days) = days else {
        return entries;
    };

    let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
    let cutoff_str = cutoff.to_rfc3339();

    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff_str)
        .collect()
}

/// Delete the step log file, if it exists.
pub fn truncate_log(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StepError;

    #[test]
    fn entry_from_advanced_report() {
        let report = StepReport {
            index: 12,
            latency_ms: 4,
            outcome: StepOutcome::Advanced {
                correct: 10,
                incorrect: 3,
                new_miss: Some(3),
                chart_skipped: false,
            },
        };
        let entry = StepLogEntry::from_report(&report);
        assert_eq!(entry.index, 12);
        assert_eq!(entry.outcome, "ok");
        assert_eq!(entry.correct, Some(10));
        assert_eq!(entry.incorrect, Some(3));
        assert_eq!(entry.new_miss, Some(3));
        assert!(entry.error.is_none());
    }

    #[test]
    fn entry_from_failed_report() {
        let report = StepReport {
            index: 7,
            latency_ms: 2,
            outcome: StepOutcome::Failed(StepError::RequestFailed { status: 500 }),
        };
        let entry = StepLogEntry::from_report(&report);
        assert_eq!(entry.outcome, "request-failed");
        assert!(entry.correct.is_none());
        assert!(entry.error.unwrap().contains("500"));
    }

    #[test]
    fn entry_roundtrips_through_json() {
        let entry = StepLogEntry {
            timestamp: "2026-01-15T10:00:00+00:00".to_string(),
            index: 5,
            outcome: "ok".to_string(),
            correct: Some(5),
            incorrect: Some(0),
            latency_ms: 3,
            new_miss: None,
            error: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        // Unset optionals are omitted from the line entirely
        assert!(!json.contains("new_miss"));
        let back: StepLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.index, 5);
        assert_eq!(back.correct, Some(5));
    }

    #[test]
    fn disabled_logger_writes_nothing() {
        let logger = StepLogger::disabled();
        logger.log(&StepReport {
            index: 0,
            latency_ms: 0,
            outcome: StepOutcome::Advanced {
                correct: 1,
                incorrect: 0,
                new_miss: None,
                chart_skipped: true,
            },
        });
        // Nothing to assert beyond "didn't panic" — there is no path.
        assert!(logger.path.is_none());
    }

    #[test]
    fn read_all_entries_skips_malformed_lines() {
        let path = std::env::temp_dir().join(format!(
            "predsweep-logger-test-{}.jsonl",
            std::process::id()
        ));
        fs::write(
            &path,
            "{\"timestamp\":\"t\",\"index\":0,\"outcome\":\"ok\",\"latency_ms\":1}\nnot json\n",
        )
        .unwrap();

        let entries = read_all_entries(&path);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome, "ok");

        let _ = fs::remove_file(&path);
    }
}
