//! antenna: artifact metadata reconciliation tool
//!
//! Merges artifact CSV exports and checks them against license compliance
//! policies.

use anyhow::{bail, Context, Result};
use antenna::{
    cli::{self, CheckFormat},
    config::{self, AntennaConfig, ConfigPreset, Validatable},
    pipeline::exit_codes,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "antenna")]
#[command(version)]
#[command(about = "Artifact metadata reconciliation tool", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success (or only policy warnings)
    1  Policy errors found
    3  Error occurred

EXAMPLES:
    # Merge two analyzer exports, later files win conflicting facts
    antenna merge scan.csv curated.csv -o merged.csv

    # Fail a CI job when artifacts are not approved
    antenna check merged.csv --preset strict")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a built-in configuration preset instead of a config file
    /// (default, strict, fill-gaps)
    #[arg(long, global = true)]
    preset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile CSV exports into one CSV
    Merge {
        /// Input CSV files, applied in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write the merged CSV to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate policy rules over reconciled CSV exports
    Check {
        /// Input CSV files, applied in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = CheckFormat::Summary)]
        format: CheckFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate JSON Schema for the config file format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a commented example config file
    ExampleConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let exit_code = match cli.command {
        Commands::Merge { ref inputs, ref output } => {
            let config = resolve_config(&cli)?;
            cli::run_merge(inputs, output.clone(), &config, cli.quiet)
        }
        Commands::Check {
            ref inputs,
            format,
            ref output,
        } => {
            let config = resolve_config(&cli)?;
            cli::run_check(inputs, format, output.clone(), &config, cli.quiet)
        }
        Commands::Schema { ref output } => {
            let schema = config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
            Ok(exit_codes::SUCCESS)
        }
        Commands::ExampleConfig => {
            print!("{}", config::generate_example_config());
            Ok(exit_codes::SUCCESS)
        }
    };

    match exit_code {
        Ok(exit_codes::SUCCESS) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

/// Preset if given, otherwise the discovered config file, validated.
fn resolve_config(cli: &Cli) -> Result<AntennaConfig> {
    let config = match &cli.preset {
        Some(name) => {
            let Some(preset) = ConfigPreset::from_name(name) else {
                bail!(
                    "unknown preset '{name}' (expected one of: {})",
                    ConfigPreset::all()
                        .iter()
                        .map(ConfigPreset::name)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            };
            AntennaConfig::from_preset(preset)
        }
        None => {
            let (config, loaded_from) = config::load_or_default(cli.config.as_deref());
            if let Some(path) = loaded_from {
                tracing::debug!("Loaded config from {}", path.display());
            }
            config
        }
    };

    let errors = config.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("invalid configuration:\n  {}", messages.join("\n  "));
    }
    Ok(config)
}
