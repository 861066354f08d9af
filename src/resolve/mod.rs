//! Resolution pipeline
//!
//! Collect → map deprecations → merge → normalize → validate. Each stage either
//! succeeds or aborts the whole resolution with its error; there is no partial
//! result.

pub mod deprecation;
pub mod normalize;
pub mod precedence;
pub mod resolved;
pub mod validate;

pub use normalize::normalize_url_prefix;
pub use precedence::Layer;
pub use resolved::{ConnectionInfo, ResolvedConfig};

use crate::error::Result;
use crate::schema::{base_schema, connection_schema, extend, ConfigItem, Schema};
use crate::sources::{cli, env, explicit, CliCollection, EnvSnapshot, ExplicitArgs, RawValueSet};
use clap::Command;
use tracing::debug;

/// Output of a full resolution, including the command-line parse result.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub config: ResolvedConfig,
    /// Present when an argument vector was given.
    pub cli: Option<CliCollection>,
}

/// Configures and runs one resolution against a schema.
///
/// The environment is whatever snapshot is handed in; nothing here reads the
/// process environment.
pub struct ConfigLoader<'s> {
    schema: &'s Schema,
    explicit: ExplicitArgs,
    cli_args: Option<Vec<String>>,
    parser: Option<Command>,
    env: EnvSnapshot,
}

impl<'s> ConfigLoader<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            explicit: ExplicitArgs::new(),
            cli_args: None,
            parser: None,
            env: EnvSnapshot::empty(),
        }
    }

    pub fn explicit(mut self, explicit: ExplicitArgs) -> Self {
        self.explicit = explicit;
        self
    }

    /// Argument vector to parse, without the program name.
    pub fn cli_args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.cli_args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Host parser to parse the argument vector with (see [`crate::argument_parser`]).
    pub fn argument_parser(mut self, parser: Command) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn env(mut self, env: EnvSnapshot) -> Self {
        self.env = env;
        self
    }

    pub fn load(self) -> Result<ResolvedConfig> {
        self.resolve().map(|resolution| resolution.config)
    }

    pub fn resolve(self) -> Result<Resolution> {
        let schema = self.schema;

        let mut raw_sets: Vec<RawValueSet> = Vec::with_capacity(3);
        raw_sets.push(env::collect(schema, &self.env));

        let cli = match &self.cli_args {
            Some(args) => {
                let collection = cli::collect(schema, args, self.parser)?;
                raw_sets.push(collection.values.clone());
                Some(collection)
            }
            None => None,
        };

        raw_sets.push(explicit::collect(schema, &self.explicit));

        let mut layers = Vec::with_capacity(raw_sets.len());
        for raw in &raw_sets {
            let canonical = deprecation::canonicalize(schema, raw)?;
            layers.push(Layer::coerce(schema, raw.kind(), canonical)?);
        }

        let mut values = precedence::merge(schema, layers);
        normalize::normalize(schema, &mut values);
        validate::validate(schema, &values)?;

        debug!("Resolved {} configuration items", values.len());
        Ok(Resolution { config: ResolvedConfig::new(schema, values), cli })
    }
}

/// Resolve only the connection items from explicit arguments and `env`.
pub fn resolve_connection_info(explicit: ExplicitArgs, env: EnvSnapshot) -> Result<ResolvedConfig> {
    ConfigLoader::new(connection_schema()).explicit(explicit).env(env).load()
}

/// Resolve the full item set, optionally extended with caller-declared items.
///
/// Explicit keys and command-line arguments outside the (extended) schema are
/// ignored and never appear in the result.
pub fn resolve_full_config(
    cli_args: &[String],
    explicit: ExplicitArgs,
    extra_items: Vec<ConfigItem>,
    env: EnvSnapshot,
) -> Result<ResolvedConfig> {
    let schema = extend(base_schema(), extra_items)?;
    ConfigLoader::new(&schema).cli_args(cli_args.iter().cloned()).explicit(explicit).env(env).load()
}

/// [`resolve_connection_info`] against the current process environment.
pub fn get_connection_info(explicit: ExplicitArgs) -> Result<ResolvedConfig> {
    resolve_connection_info(explicit, EnvSnapshot::capture())
}

/// [`resolve_full_config`] against the current process environment.
pub fn load_config(
    cli_args: &[String],
    explicit: ExplicitArgs,
    extra_items: Vec<ConfigItem>,
) -> Result<ResolvedConfig> {
    resolve_full_config(cli_args, explicit, extra_items, EnvSnapshot::capture())
}
