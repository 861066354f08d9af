//! Explicit (caller-supplied keyword) collector

use super::{RawValueSet, SourceKind};
use crate::schema::Schema;
use crate::value::Value;
use clap::ArgMatches;
use std::collections::BTreeMap;
use tracing::debug;

/// Key/value arguments supplied directly by the calling code.
///
/// Keys may be canonical item names, deprecated keys, or anything else; only
/// keys the schema recognizes are ever read. A `Value::Null` counts as not supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplicitArgs {
    values: BTreeMap<String, Value>,
}

impl ExplicitArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Treat the schema arguments of an already-parsed command line as explicit values.
    ///
    /// Lets a host application parse with its own (augmented) parser and hand the
    /// result over. Host-only arguments are ignored.
    pub fn from_arg_matches(schema: &Schema, matches: &ArgMatches) -> Self {
        let mut args = Self::new();
        for (name, value) in super::cli::values_from_matches(schema, matches).iter() {
            args.insert(name, value.clone());
        }
        args
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ExplicitArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Keep the keys that name a schema item, canonically or through a deprecated key.
pub fn collect(schema: &Schema, args: &ExplicitArgs) -> RawValueSet {
    let mut raw = RawValueSet::new(SourceKind::Explicit);

    for (key, value) in &args.values {
        if value.is_null() {
            continue;
        }
        match schema.item_for_key(key) {
            Some(item) => {
                debug!("Explicit configuration {}={}", key, item.display_value(value));
                raw.insert(key.clone(), value.clone());
            }
            None => debug!("Ignoring explicit argument '{}' not declared in schema", key),
        }
    }

    raw
}
