//! CLI for the portfolio backend E2E harness.
//!
//! This crate provides the `portfolio-e2e` command: `run` executes the probe
//! battery and persists the JSON artifact, `probes` lists the battery.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use portfolio_e2e_report::io;
use portfolio_e2e_runner::probes::PROBES;
use portfolio_e2e_runner::{run_battery, RunnerConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Portfolio backend E2E CLI.
#[derive(Parser, Debug)]
#[command(name = "portfolio-e2e")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log output format (logs go to stderr).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the probe battery and write the JSON report.
    ///
    /// Exits 0 when at least 80% of the logged results passed, 1 otherwise.
    Run {
        /// Service root URL, without the `/api` prefix.
        #[arg(short, long)]
        base_url: Option<String>,

        /// Report path override.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also write a Markdown summary next to the JSON report.
        #[arg(long)]
        markdown: bool,

        /// Do not print per-test lines to stdout.
        #[arg(short, long)]
        quiet: bool,
    },

    /// List the probes and the resolved configuration.
    Probes {
        /// TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Install the global tracing subscriber.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed, e.g. by a test harness.
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}

/// Path of the Markdown summary written next to `report_path`.
pub fn markdown_path(report_path: &Path) -> PathBuf {
    report_path.with_extension("md")
}

/// Load configuration and apply command-line overrides.
pub fn resolve_config(
    file: Option<&Path>,
    base_url: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<RunnerConfig> {
    let mut config = RunnerConfig::load(file).context("loading configuration")?;
    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    if let Some(output) = output {
        config.report_path = output;
    }
    config.validate().context("validating configuration")?;
    Ok(config)
}

/// Run the battery and persist its artifacts.
///
/// The report is written whether or not the run aborted on the health check.
/// Returns the run verdict.
pub async fn execute_run(config: &RunnerConfig, quiet: bool, markdown: bool) -> anyhow::Result<bool> {
    let outcome = run_battery(config, quiet).await?;
    let success = outcome.success;
    if outcome.aborted {
        warn!("Run aborted after failed health check");
    }

    let report = outcome.into_report();
    io::write_report(&report, &config.report_path)
        .with_context(|| format!("writing report to {}", config.report_path.display()))?;
    info!(path = %config.report_path.display(), "Report written");

    if markdown {
        let path = markdown_path(&config.report_path);
        io::write_markdown(&report, &path)
            .with_context(|| format!("writing Markdown summary to {}", path.display()))?;
        info!(path = %path.display(), "Markdown summary written");
    }

    Ok(success)
}

/// Run the CLI with parsed arguments.
///
/// # Returns
///
/// The process exit code: success iff the run verdict is success.
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    init_tracing(cli.log_format);

    match cli.command {
        Commands::Run {
            base_url,
            output,
            config,
            markdown,
            quiet,
        } => {
            dotenvy::dotenv().ok();
            let config = resolve_config(config.as_deref(), base_url, output)?;
            let success = execute_run(&config, quiet, markdown).await?;

            if !quiet {
                println!("Results written to {}", config.report_path.display());
            }

            Ok(if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Probes { config } => {
            dotenvy::dotenv().ok();
            let config = resolve_config(config.as_deref(), None, None)?;

            println!("Portfolio backend E2E battery");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("API: {}", config.api_url());
            println!("Report: {}", config.report_path.display());
            println!();
            for (index, probe) in PROBES.iter().enumerate() {
                println!("{}. {} [{}]", index + 1, probe.name, probe.call);
                println!("   passes when {}", probe.passes_when);
            }

            Ok(ExitCode::SUCCESS)
        }
    }
}
