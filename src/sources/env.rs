//! Environment collector

use super::{RawValueSet, SourceKind};
use crate::schema::Schema;
use crate::value::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Read-only copy of the environment variable table.
///
/// Resolution never reads the process environment directly; it is handed one of
/// these, taken once at the start of a call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Snapshot the current process environment. Non-UTF-8 variables are skipped.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Collect every canonical and deprecated variable the schema knows about.
///
/// Keys of the returned set are variable names; mapping them onto items happens
/// in the deprecation pass.
pub fn collect(schema: &Schema, env: &EnvSnapshot) -> RawValueSet {
    let mut raw = RawValueSet::new(SourceKind::Environment);

    for item in schema.items() {
        let names = item
            .env_var(schema.env_prefix())
            .into_iter()
            .chain(item.deprecated_envs().map(str::to_string));
        for name in names {
            if let Some(value) = env.get(&name) {
                let value = Value::from(value);
                debug!("Environment configuration {}={}", name, item.display_value(&value));
                raw.insert(name, value);
            }
        }
    }

    raw
}
