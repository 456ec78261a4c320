//! Folio CLI - CMS page tree server.
//!
//! Provides commands for:
//! - `serve`: Start the page server
//! - `migrate`: Create the pages schema
//! - `routes`: Print the public routes derived from the page tree

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{MigrateArgs, RoutesArgs, ServeArgs};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Folio - CMS page tree server.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the page server.
    Serve(ServeArgs),
    /// Create the pages table and indexes.
    Migrate(MigrateArgs),
    /// Print public routes derived from the page tree.
    Routes(RoutesArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // Check if verbose flag is set for serve command
    let verbose = matches!(&cli.command, Commands::Serve(args) if args.verbose);

    // Initialize tracing with appropriate log level
    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = match cli.command {
        Commands::Serve(args) => rt.block_on(args.execute(VERSION)),
        Commands::Migrate(args) => rt.block_on(args.execute()),
        Commands::Routes(args) => rt.block_on(args.execute()),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
