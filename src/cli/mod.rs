//! Command-line interface for bg-config
//!
//! Provides `resolve`, `connection` and `schema` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod resolve;
mod schema;

/// Resolve Beer Garden client configuration from arguments, environment and defaults
#[derive(Parser)]
#[command(name = "bg-config")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the full configuration and print it as JSON
    Resolve(resolve::ResolveArgs),

    /// Resolve only the connection settings and print them as JSON
    Connection(resolve::ConnectionArgs),

    /// List every configuration item with its flag, variable and default
    Schema(schema::SchemaArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Resolve(args) => resolve::run(args),
        Commands::Connection(args) => resolve::run_connection(args),
        Commands::Schema(args) => schema::run(args),
    }
}
