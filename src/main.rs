//! bg-config: inspect how Beer Garden client configuration resolves
//!
//! Resolves configuration from the given arguments and the process environment
//! and prints the result.

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
