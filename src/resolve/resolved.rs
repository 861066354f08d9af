//! The resolved configuration handed back to callers

use crate::schema::Schema;
use crate::value::Value;
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

const MASK: &str = "****";

#[derive(Clone, PartialEq)]
struct Entry {
    name: String,
    value: Value,
    secret: bool,
}

/// Final, validated mapping from item name to typed value.
///
/// Holds exactly the items of the schema it was resolved against, in schema
/// order. Keys outside the schema never appear. Lookup by key (`config["bg_host"]`,
/// [`get`](Self::get)) and the named accessors read the same entries.
#[derive(Clone, PartialEq)]
pub struct ResolvedConfig {
    entries: Vec<Entry>,
}

impl ResolvedConfig {
    pub(crate) fn new(schema: &Schema, mut values: BTreeMap<String, Value>) -> Self {
        let entries = schema
            .items()
            .iter()
            .map(|item| Entry {
                name: item.name.clone(),
                value: values.remove(&item.name).unwrap_or_default(),
                secret: item.secret,
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|e| e.name == key).map(|e| &e.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.name == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_float)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn bg_host(&self) -> Option<&str> {
        self.get_str("bg_host")
    }

    pub fn bg_port(&self) -> Option<i64> {
        self.get_int("bg_port")
    }

    pub fn ssl_enabled(&self) -> Option<bool> {
        self.get_bool("ssl_enabled")
    }

    pub fn url_prefix(&self) -> Option<&str> {
        self.get_str("url_prefix")
    }

    pub fn ca_verify(&self) -> Option<bool> {
        self.get_bool("ca_verify")
    }

    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    /// JSON object of every entry, with secret values masked unless `show_secrets`.
    pub fn to_json(&self, show_secrets: bool) -> serde_json::Value {
        let map = self
            .entries
            .iter()
            .map(|e| {
                let value = if e.secret && !show_secrets && !e.value.is_null() {
                    serde_json::Value::String(MASK.to_string())
                } else {
                    serde_json::to_value(&e.value).unwrap_or(serde_json::Value::Null)
                };
                (e.name.clone(), value)
            })
            .collect();
        serde_json::Value::Object(map)
    }

    /// Deserialize the entries into a typed record such as [`ConnectionInfo`].
    pub fn extract<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.to_json(true))
    }
}

impl Index<&str> for ResolvedConfig {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        match self.get(key) {
            Some(value) => value,
            None => panic!("no configuration item named '{}'", key),
        }
    }
}

impl Serialize for ResolvedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for e in &self.entries {
            map.serialize_entry(&e.name, &e.value)?;
        }
        map.end()
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for e in &self.entries {
            if e.secret && !e.value.is_null() {
                map.entry(&e.name, &MASK);
            } else {
                map.entry(&e.name, &e.value);
            }
        }
        map.finish()
    }
}

/// Connection settings for the REST client, in typed form.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub bg_host: String,
    pub bg_port: u16,
    pub ssl_enabled: bool,
    pub api_version: Option<i64>,
    pub ca_cert: Option<String>,
    pub client_cert: Option<String>,
    pub url_prefix: Option<String>,
    pub ca_verify: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl ConnectionInfo {
    /// Base URL of the Beer Garden REST API.
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl_enabled { "https" } else { "http" };
        let prefix = self.url_prefix.as_deref().unwrap_or("/");
        format!("{}://{}:{}{}", scheme, self.bg_host, self.bg_port, prefix)
    }
}

impl TryFrom<&ResolvedConfig> for ConnectionInfo {
    type Error = serde_json::Error;

    fn try_from(config: &ResolvedConfig) -> Result<Self, Self::Error> {
        config.extract()
    }
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked = |v: &Option<String>| v.as_ref().map(|_| MASK);
        f.debug_struct("ConnectionInfo")
            .field("bg_host", &self.bg_host)
            .field("bg_port", &self.bg_port)
            .field("ssl_enabled", &self.ssl_enabled)
            .field("api_version", &self.api_version)
            .field("ca_cert", &self.ca_cert)
            .field("client_cert", &self.client_cert)
            .field("url_prefix", &self.url_prefix)
            .field("ca_verify", &self.ca_verify)
            .field("username", &self.username)
            .field("password", &masked(&self.password))
            .field("access_token", &masked(&self.access_token))
            .field("refresh_token", &masked(&self.refresh_token))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::connection_schema;

    fn resolved(entries: &[(&str, Value)]) -> ResolvedConfig {
        let values = entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        ResolvedConfig::new(connection_schema(), values)
    }

    #[test]
    fn test_key_and_accessor_lookup_agree() {
        let config = resolved(&[("bg_host", Value::from("h")), ("bg_port", Value::Int(1234))]);
        assert_eq!(config["bg_host"], Value::from("h"));
        assert_eq!(config.bg_host(), Some("h"));
        assert_eq!(config.bg_port(), Some(1234));
        assert_eq!(config.get("ca_cert"), Some(&Value::Null));
        assert!(!config.contains_key("some_parameter"));
    }

    #[test]
    fn test_entries_follow_schema_and_drop_foreign_keys() {
        let config = resolved(&[("some_parameter", Value::from("x"))]);
        assert_eq!(config.len(), connection_schema().len());
        assert_eq!(config.keys().next(), Some("bg_host"));
        assert!(config.get("some_parameter").is_none());
    }

    #[test]
    fn test_secrets_are_masked_in_debug_and_json() {
        let config = resolved(&[("password", Value::from("hunter2"))]);
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("****"));

        assert_eq!(config.to_json(false)["password"], "****");
        assert_eq!(config.to_json(true)["password"], "hunter2");
        assert_eq!(config.to_json(false)["access_token"], serde_json::Value::Null);
    }

    #[test]
    fn test_extract_connection_info() {
        let config = resolved(&[
            ("bg_host", Value::from("h")),
            ("bg_port", Value::Int(2337)),
            ("ssl_enabled", Value::Bool(false)),
            ("ca_verify", Value::Bool(true)),
            ("url_prefix", Value::from("/beer/")),
        ]);
        let info = ConnectionInfo::try_from(&config).expect("connection info");
        assert_eq!(info.bg_host, "h");
        assert_eq!(info.bg_port, 2337);
        assert_eq!(info.base_url(), "http://h:2337/beer/");
    }

    #[test]
    fn test_extract_rejects_out_of_range_port() {
        let config = resolved(&[
            ("bg_host", Value::from("h")),
            ("bg_port", Value::Int(70000)),
            ("ssl_enabled", Value::Bool(true)),
            ("ca_verify", Value::Bool(true)),
        ]);
        assert!(config.extract::<ConnectionInfo>().is_err());
    }
}
