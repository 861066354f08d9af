//! Error types for configuration resolution

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    // Invalid schema declaration (duplicate names, bad defaults, ...)
    #[error("Invalid schema for item '{item}': {reason}")]
    Schema { item: String, reason: String },

    // A raw value could not be converted to the item's declared type
    #[error("Cannot convert value '{value}' for item '{item}' to {expected}")]
    TypeCoercion {
        item: String,
        value: String,
        expected: &'static str,
    },

    // Several deprecated names for one item disagree within a single source
    #[error(
        "Conflicting deprecated names for '{item}' in {source_name}: {}",
        .aliases.join(", ")
    )]
    DeprecatedAliasConflict {
        item: String,
        source_name: &'static str,
        aliases: Vec<String>,
    },

    #[error("Required option '{item}' could not be determined from any source")]
    Validation { item: String },

    // Argument vector rejected by the built-in or caller-supplied parser
    #[error("Invalid command-line arguments")]
    Cli(#[from] clap::Error),

    // Caller-declared items could not be read
    #[error("Invalid item declaration")]
    Declaration(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn schema(item: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Schema { item: item.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
