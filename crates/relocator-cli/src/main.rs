mod commands;
mod logging;
mod progress;
mod report;

use std::collections::BTreeSet;
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, KeysArgs, RelocateArgs, ResolveArgs};
use dotenv::dotenv;
use progress::CliReporter;
use relocator_core::scanner::{self, ScanOptions};
use relocator_core::{AppConfig, ReconcileEngine, RelocationReport, RelocationStatus};
use serde::Serialize;
use tracing::{error, info, warn};

const EXIT_OK: i32 = 0;
const EXIT_NOTHING_RELOCATED: i32 = 1;
const EXIT_ERROR: i32 = 2;

fn main() {
    dotenv().ok();

    let code = {
        let _guard = logging::init_logger();
        let args = Cli::parse();
        match run(args) {
            Ok(code) => code,
            Err(err) => {
                error!("Error: {:#}", err);
                EXIT_ERROR
            }
        }
    };

    process::exit(code);
}

fn run(args: Cli) -> Result<i32> {
    match args.command {
        Some(Commands::Relocate(args)) => {
            let config = load_config()?;
            run_relocate(&config, &args)
        }
        Some(Commands::Keys(args)) => run_keys(&args),
        Some(Commands::Resolve(args)) => {
            let config = load_config()?;
            run_resolve(&config, &args)
        }
        Some(Commands::PrintConfig) => {
            let mut config = load_config()?;
            if config.record_store.database_url.is_some() {
                config.record_store.database_url = Some("********".to_string());
            }
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(EXIT_OK)
        }
        None => {
            Cli::command().print_long_help()?;
            Ok(EXIT_OK)
        }
    }
}

fn load_config() -> Result<AppConfig> {
    relocator_core::config::load_configuration().context("Error loading configuration")
}

fn run_relocate(config: &AppConfig, args: &RelocateArgs) -> Result<i32> {
    if args.dry_run {
        info!("{}", "DRY RUN MODE - No files will be moved".yellow());
    }

    info!("Processing source: {}", args.source.display());
    let options = ScanOptions::new(&config.scan.extensions);
    let scan = scanner::scan(&args.source, &options)?;
    if scan.files.is_empty() {
        warn!("No image files found in source");
        return Ok(EXIT_NOTHING_RELOCATED);
    }

    let engine = ReconcileEngine::from_config(config)?;
    let reporter = CliReporter::new();
    let run_at = chrono::Local::now();
    let report = engine.reconcile(&scan.files, args.dry_run, &reporter)?;

    if let Some(csv_path) = &args.csv {
        report::export_report(csv_path, &report, run_at)?;
        info!("CSV exported to: {}", csv_path.display());
    }

    print_summary(&report);

    if report.is_success() {
        Ok(EXIT_OK)
    } else {
        Ok(EXIT_NOTHING_RELOCATED)
    }
}

fn print_summary(report: &RelocationReport) {
    println!();
    for anomaly in &report.anomalies {
        println!(
            "{} {}: derived key '{}' but record holds '{}'",
            "anomaly".yellow(),
            anomaly.filename,
            anomaly.requested_key,
            anomaly.stored_key
        );
    }
    for outcome in &report.outcomes {
        let status = match outcome.status {
            RelocationStatus::Moved => outcome.status.to_string().green(),
            RelocationStatus::WouldMove => outcome.status.to_string().cyan(),
            RelocationStatus::Failed => outcome.status.to_string().red(),
            _ => outcome.status.to_string().yellow(),
        };
        match (&outcome.destination, &outcome.detail) {
            (Some(dest), Some(detail)) => {
                println!("{:>22} {} -> {} ({})", status, outcome.filename, dest, detail)
            }
            (Some(dest), None) => println!("{:>22} {} -> {}", status, outcome.filename, dest),
            (None, _) => println!("{:>22} {}", status, outcome.filename),
        }
    }

    let skipped = report.count(RelocationStatus::SkippedNoRemoteMatch)
        + report.count(RelocationStatus::SkippedMissingLocal);
    println!();
    if report.dry_run {
        info!(
            "Would move {} files, {} skipped",
            format!("{}", report.would_move()).cyan(),
            format!("{}", skipped).yellow(),
        );
    } else {
        info!(
            "Moved {} files, {} skipped, {} failed",
            format!("{}", report.moved()).green(),
            format!("{}", skipped).yellow(),
            format!("{}", report.failed()).red(),
        );
    }

    if report.is_success() {
        if report.dry_run {
            info!("{}", "Dry run completed successfully".green());
        } else {
            info!("{}", "Operation completed successfully".green());
        }
    } else {
        warn!("{}", "Operation failed or no files were moved".red());
    }
}

#[derive(Serialize)]
struct KeysOutput<'a> {
    files: &'a [relocator_core::LocalFile],
    unique_keys: &'a BTreeSet<String>,
}

fn run_keys(args: &KeysArgs) -> Result<i32> {
    let options = match relocator_core::config::load_scan_configuration() {
        Ok(scan) => ScanOptions::new(&scan.extensions),
        Err(err) => {
            warn!("Error loading scan configuration, using default extensions: {}", err);
            ScanOptions::default()
        }
    };

    let scan = scanner::scan(&args.path, &options)?;
    let keys: BTreeSet<String> = scan
        .files
        .iter()
        .map(|f| f.identifying_key().to_string())
        .collect();

    if let Some(csv_path) = &args.csv {
        report::export_keys(csv_path, &keys)?;
        if !args.quiet {
            info!("CSV exported to: {}", csv_path.display());
        }
    }

    if args.json {
        let output = KeysOutput {
            files: &scan.files,
            unique_keys: &keys,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if args.quiet {
        if args.csv.is_none() {
            for key in &keys {
                println!("{}", key);
            }
        }
    } else {
        for file in &scan.files {
            println!("{} -> {}", file.filename(), file.identifying_key().bold());
        }
        if keys.is_empty() {
            info!("No image files were processed");
        } else {
            info!("Total unique keys: {}", keys.len());
        }
    }

    Ok(EXIT_OK)
}

fn run_resolve(config: &AppConfig, args: &ResolveArgs) -> Result<i32> {
    let options = ScanOptions::new(&config.scan.extensions);
    let scan = scanner::scan(&args.path, &options)?;

    let engine = ReconcileEngine::from_config(config)?;
    let pairs: Vec<(String, String)> = scan
        .files
        .iter()
        .map(|f| (f.filename().to_string(), f.identifying_key().to_string()))
        .collect();
    let resolution = engine.resolver().resolve(&pairs)?;

    for file in &scan.files {
        match resolution.destinations.get(file.filename()) {
            Some(dest) => println!("{} -> {}", file.filename(), dest.canonical_path.green()),
            None => println!("{} -> {}", file.filename(), "no record".yellow()),
        }
    }
    for anomaly in &resolution.anomalies {
        warn!(
            "{}: derived key '{}' but record holds '{}'",
            anomaly.filename, anomaly.requested_key, anomaly.stored_key
        );
    }
    info!(
        "{} of {} files resolved",
        resolution.destinations.len(),
        scan.files.len()
    );

    if resolution.destinations.is_empty() {
        Ok(EXIT_NOTHING_RELOCATED)
    } else {
        Ok(EXIT_OK)
    }
}
