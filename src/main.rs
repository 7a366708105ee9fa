//! Workflow Deployer CLI Entry Point
//!
//! Deploys every workflow folder below the working directory.
//!
//! # Usage
//!
//! ```bash
//! # Deploy all workflow folders in the current directory
//! workflow-deployer
//!
//! # Deploy from another directory
//! workflow-deployer --working-dir /path/to/workflows
//!
//! # Show debug output
//! workflow-deployer --verbose
//! ```

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;
use log::info;

use workflow_deployer::{BatchSummary, Reorganizer, APP_NAME, VERSION};

/// Command-line configuration parsed from arguments.
#[derive(Debug, Default, PartialEq)]
struct Config {
    working_dir: Option<PathBuf>,
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
///
/// Everything goes to stdout so progress and diagnostics stay in order.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME, VERSION);
    println!("Workflow Deployment Packager");
    println!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: workflow-deployer [OPTIONS]");
    println!();
    println!("Copies each workflow folder in the working directory into");
    println!("deploy/workflows/<workflowname>/.");
    println!();
    println!("Options:");
    println!("  --working-dir PATH  Directory holding the workflow folders (default: current)");
    println!("  --verbose           Enable debug logging");
    println!("  --help              Show this help message");
    println!("  --version           Show version information");
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--working-dir" => {
                i += 1;
                if i >= args.len() {
                    return Err("--working-dir requires a path argument".to_string());
                }
                config.working_dir = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                return Err(format!("Unexpected argument: {}", arg));
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Resolves the directory whose sub-folders are deployed.
fn resolve_base_dir(working_dir: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let Some(dir) = working_dir else {
        let current = env::current_dir()?;
        info!("Working directory: {}", current.display());
        return Ok(current);
    };

    if !dir.exists() {
        return Err(format!("Working directory does not exist: {}", dir.display()).into());
    }

    if !dir.is_dir() {
        return Err(format!("Path is not a directory: {}", dir.display()).into());
    }

    let dir = dir.canonicalize()?;
    info!("Working directory: {}", dir.display());
    Ok(dir)
}

/// Prints per-run totals after all folders were handled.
fn print_summary(summary: &BatchSummary) {
    if summary.processed() == 0 {
        return;
    }

    println!();
    println!(
        "Processed {} workflow folder(s): {} deployed, {} failed, {} warning(s)",
        summary.processed(),
        summary.succeeded().to_string().green(),
        summary.failed().to_string().red(),
        summary.warnings().to_string().yellow()
    );

    for (folder, err) in &summary.failures {
        println!("  {} {}: {}", "failed".red(), folder.display(), err);
    }

    for report in summary.reports.iter().filter(|r| !r.is_complete()) {
        println!(
            "  {} {} from {}",
            "partial".yellow(),
            report.workflow_name,
            report.source_dir.display()
        );
        for item in &report.copied {
            println!("    copied {} ({})", item.name, item.kind);
        }
        for diagnostic in &report.diagnostics {
            println!("    {}", diagnostic);
        }
    }
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    setup_logging(config.verbose);
    print_banner();

    let base_dir = resolve_base_dir(config.working_dir)?;
    let reorganizer = Reorganizer::new(base_dir);

    // Per-workflow failures are reported, never turned into an exit code
    let summary = reorganizer.reorganize_all()?;
    print_summary(&summary);

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
