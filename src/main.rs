use anyhow::Result;
use clap::{Parser, Subcommand};

use predsweep::{cli, config, web};

#[derive(Debug, Parser)]
#[command(name = "predsweep")]
#[command(about = "Sequential whole-dataset evaluation of a prediction service")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sweep the full dataset: one prediction per tick, chart and miss
    /// gallery updated along the way
    Run {
        /// Override the number of samples to sweep
        #[arg(long)]
        samples: Option<u64>,
        /// Override the tick cadence in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Override the prediction service base URL
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Test a single sample and show the decoded result
    Probe {
        /// Sample index to test
        index: u64,
    },
    /// Zero the service counters and clear the local gallery and step log
    Reset,
    /// Show aggregated sweep statistics from the step log
    Stats {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Check system health: endpoint, config, gallery, step log
    Health,
    /// Serve the web dashboard
    Web {
        /// Override the listen address
        #[arg(long)]
        addr: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show the effective (merged) configuration
    Show,
    /// Create ~/.predsweep/config.toml with annotated defaults
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set a single config key (dotted, e.g. sweep.interval_ms)
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Run {
            samples,
            interval_ms,
            endpoint,
        } => cli::run_sweep(samples, interval_ms, endpoint),
        Commands::Probe { index } => cli::run_probe(index),
        Commands::Reset => cli::run_reset(),
        Commands::Stats { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(fmt, days)
        }
        Commands::Health => cli::run_health(),
        Commands::Web { addr } => {
            let addr = addr.unwrap_or_else(|| config::load().web.addr);
            web::serve(&addr)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::run_config_show(),
            ConfigCommands::Init { force } => cli::run_config_init(force),
            ConfigCommands::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigCommands::Reset => cli::run_config_reset(),
        },
    }
}
