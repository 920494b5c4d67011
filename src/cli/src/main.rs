//! adrole - Active Directory role resolution
//!
//! Reads a directory snapshot workbook, derives roles from a catalog of
//! role-eligible group names, and writes the Roles, Group_Roles and
//! User_Roles sheets alongside the validated input.

use adrole_cli::config::AppConfig;
use adrole_cli::pipeline::{map_dataset, run_batch, validate_only};
use adrole_cli::workbook::{load_catalog, JsonWorkbook};
use adrole_engine::RoleEngine;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

/// adrole CLI
#[derive(Parser)]
#[command(name = "adrole")]
#[command(about = "Derive roles from Active Directory group nesting")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "ADROLE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (overrides config)
    #[arg(long, global = true, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve roles for one workbook
    Map {
        /// Input workbook
        #[arg(short, long)]
        input: PathBuf,

        /// Output workbook
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Resolve roles for every workbook in a directory
    Batch {
        /// Directory of input workbooks
        #[arg(long)]
        input_dir: PathBuf,

        /// Directory for processed workbooks
        #[arg(long)]
        output_dir: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Validate a workbook without resolving roles
    Validate {
        /// Input workbook
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Args)]
struct EngineArgs {
    /// Role catalog file (overrides config)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Category whose names anchor roles first (overrides config)
    #[arg(long)]
    priority_category: Option<String>,

    /// Project roles in parallel
    #[arg(long)]
    parallel: bool,
}

impl EngineArgs {
    fn apply(self, config: &mut AppConfig) {
        if let Some(catalog) = self.catalog {
            config.catalog.path = catalog;
        }
        if let Some(category) = self.priority_category {
            config.engine.priority_category = category;
        }
        if self.parallel {
            config.engine.parallel = true;
        }
    }
}

fn main() {
    if let Err(e) = run() {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    init_logging(&config.logging.level);

    match cli.command {
        Command::Map { input, output, engine } => {
            engine.apply(&mut config);
            config.validate()?;

            let catalog = load_catalog(&config.catalog.path)
                .with_context(|| format!("Failed to load catalog {}", config.catalog.path.display()))?;
            let engine = RoleEngine::new(config.engine.clone()).context("Invalid engine configuration")?;

            let summary = map_dataset(
                &JsonWorkbook::new(&input),
                &JsonWorkbook::new(&output),
                &catalog,
                &engine,
            )
            .with_context(|| format!("Failed to process {}", input.display()))?;

            println!("{}", summary);
        }
        Command::Batch { input_dir, output_dir, engine } => {
            engine.apply(&mut config);
            config.validate()?;

            let catalog = load_catalog(&config.catalog.path)
                .with_context(|| format!("Failed to load catalog {}", config.catalog.path.display()))?;
            let engine = RoleEngine::new(config.engine.clone()).context("Invalid engine configuration")?;

            let report = run_batch(&input_dir, &output_dir, &catalog, &engine)
                .with_context(|| format!("Batch run over {} failed", input_dir.display()))?;

            for summary in &report.processed {
                println!("{}\n", summary);
            }
            for (path, reason) in &report.failed {
                println!("Failed: {} ({})", path.display(), reason);
            }
            info!(
                processed = report.processed.len(),
                failed = report.failed.len(),
                "Batch complete"
            );

            if !report.is_success() {
                anyhow::bail!("{} workbook(s) failed", report.failed.len());
            }
        }
        Command::Validate { input } => {
            config.validate()?;

            let dataset = validate_only(&JsonWorkbook::new(&input))
                .with_context(|| format!("Validation of {} failed", input.display()))?;

            for warning in &dataset.report.warnings {
                println!("warning: {}", warning);
            }
            println!(
                "{} is valid: {} users, {} groups, {} memberships, {} nesting edges",
                input.display(),
                dataset.directory.users.len(),
                dataset.directory.groups.len(),
                dataset.directory.memberships.len(),
                dataset.directory.nesting.len()
            );
        }
    }

    Ok(())
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},adrole_engine={}", level, level).into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
