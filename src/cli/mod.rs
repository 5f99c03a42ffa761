//! CLI command implementations for predsweep.
//!
//! Provides subcommand handlers for:
//! - `predsweep run` — drive the sweep loop to completion
//! - `predsweep probe <index>` — test a single sample without sweeping
//! - `predsweep reset` — zero the service counters and clear local state
//! - `predsweep stats` — aggregated step log report
//! - `predsweep health` — check endpoint, config, gallery, log
//! - `predsweep config show|init|set|reset` — configuration management

use anyhow::Result;
use colored::Colorize;

use crate::analytics::logger::{self, StepLogger};
use crate::analytics::reporter::{self, SweepStats};
use crate::client::{PredictClient, Predictor};
use crate::config;
use crate::gallery::{self, MissGallery};
use crate::render::TerminalChart;
use crate::tester::{SampleTester, StepOutcome};

/// Output format for analytics commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// predsweep run
// ---------------------------------------------------------------------------

/// Drive a full sweep against the prediction service.
///
/// CLI flags override the resolved config; a sweep always starts at
/// index 0 (progress is never persisted).
pub fn run_sweep(
    samples: Option<u64>,
    interval_ms: Option<u64>,
    endpoint: Option<String>,
) -> Result<()> {
    let mut cfg = config::load();
    if let Some(n) = samples {
        cfg.sweep.total_samples = n;
    }
    if let Some(ms) = interval_ms {
        cfg.sweep.interval_ms = ms;
    }
    if let Some(url) = endpoint {
        cfg.endpoint.url = url;
    }

    let client = PredictClient::from_config(&cfg.endpoint);
    let gallery = MissGallery::from_config(&cfg.gallery);
    let step_logger = StepLogger::from_config(&cfg.logging);

    println!(
        "{} {} samples against {} (tick {} ms)",
        "Sweeping".bold().cyan(),
        format_number(cfg.sweep.total_samples as usize),
        client.base_url(),
        cfg.sweep.interval_ms,
    );
    println!();

    let mut tester = SampleTester::new(client, TerminalChart::new(), gallery, &cfg.sweep);

    let summary = tester.start(|report| {
        step_logger.log(report);
        if let StepOutcome::Failed(err) = &report.outcome {
            eprintln!(
                "  {} sample {}: {}",
                "step failed".yellow(),
                report.index,
                err
            );
        }
    })?;

    // The user-visible completion signal.
    println!();
    println!(
        "{}",
        "All test samples have been processed!".bold().green()
    );
    println!(
        "  {} {}  {} {}  {} {}",
        "Correct:".bold(),
        format_number(summary.correct as usize),
        "Incorrect:".bold(),
        format_number(summary.incorrect as usize),
        "Failed steps:".bold(),
        format_number(summary.failed_steps as usize),
    );
    if !tester.gallery().is_empty() {
        println!(
            "  {} {} miss image(s) in {}",
            "Gallery:".bold(),
            tester.gallery().len(),
            tester.gallery().dir().display()
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// predsweep probe
// ---------------------------------------------------------------------------

/// Test a single sample and display the decoded result without advancing
/// any sweep state.
pub fn run_probe(index: u64) -> Result<()> {
    let cfg = config::load();
    let mut client = PredictClient::from_config(&cfg.endpoint);

    let prediction = client
        .predict(index)
        .map_err(|err| anyhow::anyhow!("probe of sample {index} failed: {err}"))?;

    println!("{}", "predsweep Probe".bold().cyan());
    println!("{}", "=".repeat(40));
    println!("  {} {}", "Sample index:".bold(), index);
    if let (Some(predicted), Some(actual)) = (prediction.prediction, prediction.true_label) {
        let verdict = if prediction.is_incorrect == Some(true) {
            "incorrect".red().bold()
        } else {
            "correct".green().bold()
        };
        println!(
            "  {} {} (actual {}) — {}",
            "Predicted:   ".bold(),
            predicted,
            actual,
            verdict
        );
    }
    println!(
        "  {} {} correct / {} incorrect",
        "Running:     ".bold(),
        prediction.correct,
        prediction.incorrect
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// predsweep reset
// ---------------------------------------------------------------------------

/// Zero the service-side counters, delete its stored miss images, and clear
/// the local gallery and step log.
pub fn run_reset() -> Result<()> {
    let cfg = config::load();
    let client = PredictClient::from_config(&cfg.endpoint);

    let ack = client.reset()?;
    println!("{} {}", "✓".green().bold(), ack.message);
    println!(
        "  Service counters: {} correct / {} incorrect",
        ack.correct, ack.incorrect
    );

    let gallery_dir = config::expand_home(&cfg.gallery.dir);
    let removed = gallery::clear_directory(&gallery_dir)?;
    if removed > 0 {
        println!("  Removed {removed} local miss image(s)");
    }

    logger::truncate_log(&logger::log_path(&cfg.logging))?;
    println!("  Step log cleared");

    Ok(())
}

// ---------------------------------------------------------------------------
// predsweep stats
// ---------------------------------------------------------------------------

/// Show aggregated sweep statistics from the step log.
pub fn run_stats(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let cfg = config::load();
    let stats = reporter::compute_stats(&logger::log_path(&cfg.logging), days);

    if stats.steps == 0 {
        println!(
            "{}",
            "No data yet. Run a sweep with `predsweep run` to see stats.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_stats_json(&stats)?,
        OutputFormat::Csv => print_stats_csv(&stats),
        OutputFormat::Table => print_stats_table(&stats),
    }

    Ok(())
}

fn print_stats_table(stats: &SweepStats) {
    println!("{}", "predsweep Sweep Report".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    // Summary
    println!("  {} {}", "Steps attempted:".bold(), format_number(stats.steps));
    println!(
        "  {} {}",
        "Samples done:   ".bold(),
        format_number(stats.samples_done as usize)
    );
    println!(
        "  {} {} correct / {} incorrect ({:.2}% accuracy)",
        "Counts:         ".bold(),
        format_number(stats.correct as usize),
        format_number(stats.incorrect as usize),
        stats.accuracy_pct,
    );
    println!("  {} {}", "Misses recorded:".bold(), stats.misses);
    println!(
        "  {} {:.1} ms",
        "Avg latency:    ".bold(),
        stats.avg_latency_ms
    );
    println!();

    // Outcome distribution
    let dist = &stats.outcomes;
    println!("{}", "Step Outcomes".bold().cyan());
    println!(
        "  ok: {} ({:.0}%)  request-failed: {}  unreachable: {}  decode-failed: {}  container-missing: {}",
        dist.ok,
        dist.pct(dist.ok),
        dist.request_failed,
        dist.unreachable,
        dist.decode_failed,
        dist.container_missing,
    );
}

fn print_stats_json(stats: &SweepStats) -> Result<()> {
    let value = serde_json::json!({
        "steps": stats.steps,
        "advanced": stats.advanced,
        "failed": stats.failed,
        "samples_done": stats.samples_done,
        "correct": stats.correct,
        "incorrect": stats.incorrect,
        "accuracy_pct": stats.accuracy_pct,
        "misses": stats.misses,
        "avg_latency_ms": stats.avg_latency_ms,
        "outcomes": {
            "ok": stats.outcomes.ok,
            "request_failed": stats.outcomes.request_failed,
            "unreachable": stats.outcomes.unreachable,
            "decode_failed": stats.outcomes.decode_failed,
            "container_missing": stats.outcomes.container_missing,
        },
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_stats_csv(stats: &SweepStats) {
    println!("steps,advanced,failed,samples_done,correct,incorrect,accuracy_pct,misses,avg_latency_ms");
    println!(
        "{},{},{},{},{},{},{:.2},{},{:.1}",
        stats.steps,
        stats.advanced,
        stats.failed,
        stats.samples_done,
        stats.correct,
        stats.incorrect,
        stats.accuracy_pct,
        stats.misses,
        stats.avg_latency_ms,
    );
}

// ---------------------------------------------------------------------------
// predsweep health
// ---------------------------------------------------------------------------

/// Check system health: endpoint, config, gallery directory, step log.
pub fn run_health() -> Result<()> {
    println!("{}", "predsweep Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    // 0. Config file status
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.predsweep/config.toml found"
        } else {
            "not found (run `predsweep config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".predsweep.toml found"
        } else {
            "none (optional)"
        },
    );

    // 1. Endpoint connectivity
    let client = PredictClient::from_config(&cfg.endpoint);
    let reachable = client.is_healthy();
    let endpoint_detail = if reachable {
        format!("reachable at {}", client.base_url())
    } else {
        format!("{} not reachable — is the service running?", client.base_url())
    };
    print_health_item("Endpoint", reachable, &endpoint_detail);

    // 2. Sweep parameters
    print_health_item(
        "Sweep",
        true,
        &format!(
            "{} samples, {} ms tick",
            cfg.sweep.total_samples, cfg.sweep.interval_ms
        ),
    );

    // 3. Gallery directory
    let gallery_dir = config::expand_home(&cfg.gallery.dir);
    let gallery_exists = gallery_dir.is_dir();
    print_health_item(
        "Gallery",
        gallery_exists || !cfg.gallery.download,
        &if cfg.gallery.download {
            format!("{} (created at sweep start)", gallery_dir.display())
        } else {
            "downloads disabled — references only".to_string()
        },
    );

    // 4. Step log
    let log_path = logger::log_path(&cfg.logging);
    let log_exists = log_path.exists();
    let log_entries = if log_exists {
        logger::read_all_entries(&log_path).len()
    } else {
        0
    };
    print_health_item(
        "Step log",
        log_exists || !cfg.logging.enabled,
        &if !cfg.logging.enabled {
            "disabled".to_string()
        } else if log_exists {
            format!("{log_entries} entries")
        } else {
            "no log file yet".to_string()
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<16} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// predsweep config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective predsweep Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    // Show source info
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.predsweep/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.predsweep/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".predsweep.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".predsweep.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "PREDSWEEP_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.predsweep/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Edit the file to customize predsweep behavior.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(70000), "70,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }
}
