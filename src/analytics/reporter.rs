//! Analytics reporter — aggregation over the JSONL step log.
//!
//! Provides:
//! - **Stats**: step totals, outcome distribution, latest counts, accuracy
//! - **Progress**: the dashboard's view of how far the sweep has gotten

use std::path::Path;

use crate::analytics::logger::{self, StepLogEntry};

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

/// Summary statistics for `predsweep stats`.
#[derive(Debug)]
pub struct SweepStats {
    /// Step attempts logged, successful or not.
    pub steps: usize,
    pub advanced: usize,
    pub failed: usize,
    /// Samples completed: one past the highest successfully tested index.
    pub samples_done: u64,
    /// Latest running counts reported by the service.
    pub correct: u64,
    pub incorrect: u64,
    pub accuracy_pct: f64,
    /// Distinct miss ids recorded.
    pub misses: usize,
    pub outcomes: OutcomeDistribution,
    pub avg_latency_ms: f64,
}

/// Distribution across step outcomes.
#[derive(Debug, Default)]
pub struct OutcomeDistribution {
    pub ok: usize,
    pub request_failed: usize,
    pub unreachable: usize,
    pub decode_failed: usize,
    pub container_missing: usize,
}

impl OutcomeDistribution {
    pub fn total(&self) -> usize {
        self.ok + self.request_failed + self.unreachable + self.decode_failed
            + self.container_missing
    }

    /// Percentage for a given outcome, returns 0.0 if total is zero.
    pub fn pct(&self, count: usize) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (count as f64 / total as f64) * 100.0
        }
    }
}

/// The dashboard's view of sweep progress.
#[derive(Debug, Clone)]
pub struct Progress {
    pub total_samples: u64,
    pub samples_done: u64,
    pub correct: u64,
    pub incorrect: u64,
    pub accuracy_pct: f64,
    pub failed_steps: usize,
    pub complete: bool,
}

// ---------------------------------------------------------------------------
// Stats computation
// ---------------------------------------------------------------------------

/// Compute aggregate stats from the step log, optionally filtered to the
/// last `days` days.
pub fn compute_stats(path: &Path, days: Option<u32>) -> SweepStats {
    let entries = logger::read_entries_since_days(path, days);
    build_stats(&entries)
}

pub fn build_stats(entries: &[StepLogEntry]) -> SweepStats {
    let outcomes = outcome_distribution(entries);
    let advanced = outcomes.ok;
    let failed = entries.len() - advanced;

    let samples_done = entries
        .iter()
        .filter(|e| e.outcome == "ok")
        .map(|e| e.index + 1)
        .max()
        .unwrap_or(0);

    let (correct, incorrect) = latest_counts(entries);
    let tested = correct + incorrect;
    let accuracy_pct = if tested == 0 {
        0.0
    } else {
        (correct as f64 / tested as f64) * 100.0
    };

    let avg_latency_ms = if entries.is_empty() {
        0.0
    } else {
        entries.iter().map(|e| e.latency_ms as f64).sum::<f64>() / entries.len() as f64
    };

    SweepStats {
        steps: entries.len(),
        advanced,
        failed,
        samples_done,
        correct,
        incorrect,
        accuracy_pct,
        misses: recorded_misses(entries).len(),
        outcomes,
        avg_latency_ms,
    }
}

fn outcome_distribution(entries: &[StepLogEntry]) -> OutcomeDistribution {
    let mut dist = OutcomeDistribution::default();
    for entry in entries {
        match entry.outcome.as_str() {
            "ok" => dist.ok += 1,
            "request-failed" => dist.request_failed += 1,
            "unreachable" => dist.unreachable += 1,
            "decode-failed" => dist.decode_failed += 1,
            _ => dist.container_missing += 1,
        }
    }
    dist
}

/// Latest running counts: the last successful entry wins (the log is
/// append-only, so file order is time order).
fn latest_counts(entries: &[StepLogEntry]) -> (u64, u64) {
    entries
        .iter()
        .rev()
        .find_map(|e| match (e.correct, e.incorrect) {
            (Some(c), Some(i)) => Some((c, i)),
            _ => None,
        })
        .unwrap_or((0, 0))
}

/// Distinct miss ids recorded across the log, ascending.
pub fn recorded_misses(entries: &[StepLogEntry]) -> Vec<u64> {
    let mut ids: Vec<u64> = entries.iter().filter_map(|e| e.new_miss).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Compute the dashboard progress view from the full step log.
pub fn compute_progress(path: &Path, total_samples: u64) -> Progress {
    let entries = logger::read_all_entries(path);
    build_progress(&entries, total_samples)
}

pub fn build_progress(entries: &[StepLogEntry], total_samples: u64) -> Progress {
    let stats = build_stats(entries);
    Progress {
        total_samples,
        samples_done: stats.samples_done,
        correct: stats.correct,
        incorrect: stats.incorrect,
        accuracy_pct: stats.accuracy_pct,
        failed_steps: stats.failed,
        complete: total_samples > 0 && stats.samples_done >= total_samples,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: u64, outcome: &str, counts: Option<(u64, u64)>, new_miss: Option<u64>) -> StepLogEntry {
        StepLogEntry {
            timestamp: format!("2026-01-15T10:00:{:02}+00:00", index % 60),
            index,
            outcome: outcome.to_string(),
            correct: counts.map(|(c, _)| c),
            incorrect: counts.map(|(_, i)| i),
            latency_ms: 4,
            new_miss,
            error: if outcome == "ok" {
                None
            } else {
                Some("boom".to_string())
            },
        }
    }

    fn sample_entries() -> Vec<StepLogEntry> {
        vec![
            entry(0, "ok", Some((1, 0)), None),
            entry(1, "ok", Some((1, 1)), Some(1)),
            entry(2, "request-failed", None, None),
            entry(2, "ok", Some((2, 1)), None),
            entry(3, "ok", Some((3, 1)), None),
        ]
    }

    #[test]
    fn build_stats_totals() {
        let stats = build_stats(&sample_entries());
        assert_eq!(stats.steps, 5);
        assert_eq!(stats.advanced, 4);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.samples_done, 4);
        assert_eq!(stats.correct, 3);
        assert_eq!(stats.incorrect, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.accuracy_pct, 75.0);
    }

    #[test]
    fn outcome_distribution_counts_by_label() {
        let stats = build_stats(&sample_entries());
        assert_eq!(stats.outcomes.ok, 4);
        assert_eq!(stats.outcomes.request_failed, 1);
        assert_eq!(stats.outcomes.total(), 5);
        assert_eq!(stats.outcomes.pct(stats.outcomes.ok), 80.0);
    }

    #[test]
    fn empty_entries_produce_zeroed_stats() {
        let stats = build_stats(&[]);
        assert_eq!(stats.steps, 0);
        assert_eq!(stats.samples_done, 0);
        assert_eq!(stats.accuracy_pct, 0.0);
        assert_eq!(stats.outcomes.pct(0), 0.0);
    }

    #[test]
    fn latest_counts_come_from_last_successful_entry() {
        let mut entries = sample_entries();
        // Trailing failure must not blank out the counts
        entries.push(entry(4, "unreachable", None, None));
        let stats = build_stats(&entries);
        assert_eq!(stats.correct, 3);
        assert_eq!(stats.incorrect, 1);
    }

    #[test]
    fn recorded_misses_dedupes() {
        let entries = vec![
            entry(0, "ok", Some((0, 1)), Some(1)),
            entry(1, "ok", Some((0, 2)), Some(2)),
            entry(2, "ok", Some((1, 2)), None),
        ];
        assert_eq!(recorded_misses(&entries), vec![1, 2]);
    }

    #[test]
    fn progress_reports_completion_at_bound() {
        let entries = vec![
            entry(0, "ok", Some((1, 0)), None),
            entry(1, "ok", Some((2, 0)), None),
        ];
        let progress = build_progress(&entries, 2);
        assert_eq!(progress.samples_done, 2);
        assert!(progress.complete);

        let partial = build_progress(&entries, 70_000);
        assert!(!partial.complete);
    }
}
