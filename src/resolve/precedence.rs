//! Precedence resolver
//!
//! Priority, lowest first: schema default, environment, command line, explicit
//! arguments. Each item is decided on its own; the highest-priority source that
//! supplied the item wins.

use crate::error::Result;
use crate::schema::Schema;
use crate::sources::SourceKind;
use crate::value::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Typed, canonical values supplied by one source.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: SourceKind,
    pub values: BTreeMap<String, Value>,
}

impl Layer {
    /// Coerce canonical raw values to their item types.
    ///
    /// Values that do not count as supplied (an empty string for a non-string
    /// item) are dropped so they cannot shadow a lower-priority source.
    pub fn coerce(
        schema: &Schema,
        kind: SourceKind,
        canonical: BTreeMap<String, Value>,
    ) -> Result<Layer> {
        let mut values = BTreeMap::new();
        for (name, raw) in canonical {
            let Some(item) = schema.get(&name) else {
                continue;
            };
            match raw.coerce(&item.name, item.item_type)? {
                Some(value) => {
                    values.insert(name, value);
                }
                None => debug!("Empty value for '{}' in {} treated as unset", name, kind),
            }
        }
        Ok(Layer { kind, values })
    }
}

/// Merge `layers` over the schema defaults. Every schema item appears in the result.
pub fn merge(schema: &Schema, mut layers: Vec<Layer>) -> BTreeMap<String, Value> {
    layers.sort_by_key(|layer| layer.kind);

    let mut merged = BTreeMap::new();
    for item in schema.items() {
        let mut value = &item.default;
        let mut from = SourceKind::Default;

        for layer in &layers {
            if let Some(supplied) = layer.values.get(&item.name) {
                value = supplied;
                from = layer.kind;
            }
        }

        debug!("Resolved {}={} from {}", item.name, item.display_value(value), from);
        merged.insert(item.name.clone(), value.clone());
    }

    merged
}
