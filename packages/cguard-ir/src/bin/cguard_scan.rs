//! cguard-scan: vulnerability scan of C source files
//!
//! # Usage
//!
//! ```bash
//! cguard-scan src/*.c
//! cguard-scan --preset thorough --format json --fail-on high vuln.c
//! cguard-scan --config cguard.yaml -v vuln.c
//! ```
//!
//! Exit status: 0 clean, 1 when a finding reaches `--fail-on`, 2 on I/O or
//! configuration errors.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cguard_ir::{AnalysisConfig, AnalysisEngine, Preset, Severity};

#[derive(Parser)]
#[command(name = "cguard-scan")]
#[command(about = "Intraprocedural vulnerability scan of C function bodies", long_about = None)]
struct Cli {
    /// C source files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Analysis preset (fast, balanced, thorough)
    #[arg(short, long, default_value = "balanced", value_parser = Preset::from_str)]
    preset: Preset,

    /// YAML configuration file (overrides --preset)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Drop findings below this severity
    #[arg(long, value_parser = Severity::from_str)]
    min_severity: Option<Severity>,

    /// Exit with status 1 when any finding is at least this severe
    #[arg(long, value_parser = Severity::from_str)]
    fail_on: Option<Severity>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    /// One JSON object per finding
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::from(1),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(2)
        }
    }
}

/// Scan every file; returns whether the `--fail-on` threshold was reached
fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_yaml_file(path)?,
        None => AnalysisConfig::preset(cli.preset),
    };
    if let Some(min) = cli.min_severity {
        config = config.with_min_severity(min);
    }
    let engine = AnalysisEngine::new(config)?;

    let mut threshold_reached = false;
    for path in &cli.files {
        let source = std::fs::read_to_string(path)?;
        let run = engine.analyze_source(&source)?;
        let file = path.display().to_string();

        for (function, err) in run.failures() {
            error!(file = %file, function, "skipped: {}", err);
        }

        for finding in run.findings() {
            match cli.format {
                OutputFormat::Text => println!("{}:{}", file, finding),
                OutputFormat::Json => {
                    let mut value = serde_json::to_value(finding)?;
                    if let Some(obj) = value.as_object_mut() {
                        obj.insert("file".to_string(), serde_json::Value::String(file.clone()));
                    }
                    println!("{}", value);
                }
            }
            if cli.fail_on.is_some_and(|t| finding.severity().at_least(t)) {
                threshold_reached = true;
            }
        }

        info!(file = %file, "{}", run.summary());
    }
    Ok(threshold_reached)
}
