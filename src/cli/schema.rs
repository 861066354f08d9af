//! Schema command implementation

use anyhow::Result;
use bg_config::{base_schema, connection_schema};
use clap::Args;

#[derive(Args)]
pub struct SchemaArgs {
    /// Only list the connection items
    #[arg(long)]
    pub connection: bool,
}

pub fn run(args: SchemaArgs) -> Result<()> {
    let schema = if args.connection { connection_schema() } else { base_schema() };

    for item in schema.items() {
        let required = if item.required { " (required)" } else { "" };
        println!("{}: {}{}", item.name, item.item_type, required);

        if !item.description.is_empty() {
            println!("  {}", item.description);
        }
        println!("  default: {}", item.display_value(&item.default));
        if let Some(flag) = &item.cli_flag {
            println!("  flag: --{}", flag);
        }
        if let Some(env) = item.env_var(schema.env_prefix()) {
            println!("  env: {}", env);
        }
        if !item.deprecated_names.is_empty() {
            let names: Vec<_> = item.deprecated_names.iter().map(|d| d.as_str()).collect();
            println!("  deprecated: {}", names.join(", "));
        }
    }

    Ok(())
}
