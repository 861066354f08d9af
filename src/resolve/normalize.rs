//! Post-merge normalization

use crate::schema::{Normalization, Schema};
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static REPEATED_SLASHES: Lazy<Regex> = Lazy::new(|| Regex::new("/{2,}").expect("valid regex"));

/// `/beer`, `beer/` and `//beer//` all become `/beer/`. An empty prefix becomes `/`.
pub fn normalize_url_prefix(prefix: &str) -> String {
    let wrapped = format!("/{}/", prefix.trim());
    REPEATED_SLASHES.replace_all(&wrapped, "/").into_owned()
}

/// Apply each item's normalization to its merged value. Nulls are left alone.
pub fn normalize(schema: &Schema, values: &mut BTreeMap<String, Value>) {
    for item in schema.items() {
        let Some(rule) = item.normalize else {
            continue;
        };
        if let Some(Value::Str(current)) = values.get_mut(&item.name) {
            *current = match rule {
                Normalization::UrlPrefix => normalize_url_prefix(current),
            };
        }
    }
}
