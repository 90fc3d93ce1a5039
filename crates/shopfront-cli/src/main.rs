//! Shopfront CLI
//!
//! Command-line interface for the storefront kernel

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shopfront_core::logging_facility::{self, Profile};
use shopfront_store::config::DEFAULT_CONFIG_FILE;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "shopfront")]
#[command(about = "Shopfront - storefront extensibility kernel", long_about = None)]
struct Cli {
    /// Application config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Emit JSON log lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the kernel once: load routes, bootstrap, lock, validate settings
    Check(commands::check::CheckArgs),
    /// Print the merged route table
    Routes(commands::routes::RoutesArgs),
    /// Build client bundles for page routes that need one
    Build(commands::build::BuildArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging_facility::init(if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Check(args) => commands::check::execute(&cli.config, args).await,
        Commands::Routes(args) => commands::routes::execute(&cli.config, args),
        Commands::Build(args) => commands::build::execute(&cli.config, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
