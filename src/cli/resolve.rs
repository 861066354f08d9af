//! Resolve and connection command implementations

use anyhow::{Context, Result};
use bg_config::{base_schema, connection_schema, ConfigLoader, EnvSnapshot, ResolvedConfig, Schema};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ResolveArgs {
    /// JSON file declaring extra items, e.g. {"name": {"type": "str"}}
    #[arg(long, value_name = "FILE")]
    pub spec: Option<PathBuf>,

    /// Print secret values instead of masking them
    #[arg(long)]
    pub show_secrets: bool,

    /// Configuration arguments, given after `--` (e.g. `-- --bg-host localhost`)
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// Print secret values instead of masking them
    #[arg(long)]
    pub show_secrets: bool,

    /// Connection arguments, given after `--` (e.g. `-- --bg-host localhost`)
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

pub fn run(args: ResolveArgs) -> Result<()> {
    let schema = match &args.spec {
        Some(path) => load_spec(path)?,
        None => base_schema().clone(),
    };

    let resolution =
        ConfigLoader::new(&schema).cli_args(args.args).env(EnvSnapshot::capture()).resolve()?;

    if let Some(cli) = &resolution.cli {
        if !cli.passthrough.is_empty() {
            tracing::warn!("Ignoring unrecognized arguments: {}", cli.passthrough.join(" "));
        }
    }

    print_json(&resolution.config, args.show_secrets)
}

pub fn run_connection(args: ConnectionArgs) -> Result<()> {
    let config = ConfigLoader::new(connection_schema())
        .cli_args(args.args)
        .env(EnvSnapshot::capture())
        .load()?;

    print_json(&config, args.show_secrets)
}

fn load_spec(path: &Path) -> Result<Schema> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed reading spec file: {}", path.display()))?;

    base_schema()
        .extend()
        .declarations(&content)
        .and_then(|builder| builder.build())
        .with_context(|| format!("Invalid spec file: {}", path.display()))
}

fn print_json(config: &ResolvedConfig, show_secrets: bool) -> Result<()> {
    let rendered = serde_json::to_string_pretty(&config.to_json(show_secrets))?;
    println!("{}", rendered);
    Ok(())
}
