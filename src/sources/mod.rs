//! Source collectors
//!
//! Each collector reads one origin of configuration values and returns a
//! [`RawValueSet`] keyed the way that origin names things: argument keys for
//! explicit values and the command line, variable names for the environment.
//! Keys may still be deprecated names at this point.

pub mod cli;
pub mod env;
pub mod explicit;

pub use cli::{add_arguments, argument_parser, CliCollection};
pub use env::EnvSnapshot;
pub use explicit::ExplicitArgs;

use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Where a set of values came from, lowest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    Default,
    Environment,
    Cli,
    Explicit,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Default => "defaults",
            SourceKind::Environment => "environment",
            SourceKind::Cli => "command line",
            SourceKind::Explicit => "explicit arguments",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values one source actually supplied. Absent keys were not supplied at all.
#[derive(Debug, Clone, PartialEq)]
pub struct RawValueSet {
    kind: SourceKind,
    values: BTreeMap<String, Value>,
}

impl RawValueSet {
    pub fn new(kind: SourceKind) -> Self {
        Self { kind, values: BTreeMap::new() }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
