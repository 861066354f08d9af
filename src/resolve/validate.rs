//! Required-item validation

use crate::error::{ConfigError, Result};
use crate::schema::Schema;
use crate::value::Value;
use std::collections::BTreeMap;

/// Fail on the first required item (in schema order) with no usable value.
pub fn validate(schema: &Schema, values: &BTreeMap<String, Value>) -> Result<()> {
    for item in schema.items().iter().filter(|item| item.required) {
        if values.get(&item.name).map_or(true, Value::is_empty) {
            return Err(ConfigError::Validation { item: item.name.clone() });
        }
    }
    Ok(())
}
