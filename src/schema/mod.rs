//! Item schema: the fixed set of configurable items and how to extend it
//!
//! A [`Schema`] is immutable once built. Extending one always goes through a
//! [`SchemaBuilder`], which checks name collisions and default types before
//! producing a new value.

pub mod base;
pub mod item;

pub use base::{base_schema, connection_schema, CONNECTION_ITEMS, ENV_PREFIX};
pub use item::{ConfigItem, DeprecatedName, ItemDeclaration, Normalization};

use crate::error::{ConfigError, Result};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
pub struct Schema {
    env_prefix: String,
    items: Vec<ConfigItem>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<DeprecatedName, usize>,
}

impl Schema {
    pub fn builder(env_prefix: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder { env_prefix: env_prefix.into(), items: Vec::new() }
    }

    /// Start a builder seeded with every item of this schema.
    pub fn extend(&self) -> SchemaBuilder {
        SchemaBuilder { env_prefix: self.env_prefix.clone(), items: self.items.clone() }
    }

    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    pub fn items(&self) -> &[ConfigItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ConfigItem> {
        self.by_name.get(name).map(|&i| &self.items[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Item a deprecated name maps onto.
    pub fn item_for_alias(&self, alias: &DeprecatedName) -> Option<&ConfigItem> {
        self.by_alias.get(alias).map(|&i| &self.items[i])
    }

    /// Item addressed by an explicit-argument key, canonical or deprecated.
    pub fn item_for_key(&self, key: &str) -> Option<&ConfigItem> {
        self.get(key).or_else(|| self.item_for_alias(&DeprecatedName::Key(key.to_string())))
    }

    /// Keep only the named items, in schema order. Unknown names are ignored.
    pub fn subset(&self, names: &[&str]) -> Schema {
        let items = self.items.iter().filter(|item| names.contains(&item.name.as_str())).cloned();
        // A subset of a valid schema cannot introduce new collisions.
        Schema::index(self.env_prefix.clone(), items.collect())
    }

    fn index(env_prefix: String, items: Vec<ConfigItem>) -> Schema {
        let mut by_name = HashMap::new();
        let mut by_alias = HashMap::new();
        for (i, item) in items.iter().enumerate() {
            by_name.insert(item.name.clone(), i);
            for alias in &item.deprecated_names {
                by_alias.insert(alias.clone(), i);
            }
        }
        Schema { env_prefix, items, by_name, by_alias }
    }
}

/// Builder producing a validated, immutable [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    env_prefix: String,
    items: Vec<ConfigItem>,
}

impl SchemaBuilder {
    pub fn item(mut self, item: ConfigItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = ConfigItem>) -> Self {
        self.items.extend(items);
        self
    }

    /// Add items declared as a JSON object of `name -> declaration`.
    pub fn declarations(mut self, json: &str) -> Result<Self> {
        let declared: BTreeMap<String, ItemDeclaration> = serde_json::from_str(json)?;
        self.items.extend(declared.into_iter().map(|(name, decl)| decl.into_item(name)));
        Ok(self)
    }

    pub fn build(self) -> Result<Schema> {
        let mut names: HashMap<&str, &str> = HashMap::new();
        let mut flags: HashMap<String, &str> = HashMap::new();
        let mut envs: HashMap<String, &str> = HashMap::new();
        let mut aliases: HashMap<&DeprecatedName, &str> = HashMap::new();

        for item in &self.items {
            if item.name.is_empty() {
                return Err(ConfigError::schema("", "item name must not be empty"));
            }
            if names.insert(&item.name, &item.name).is_some() {
                return Err(ConfigError::schema(&item.name, "item is declared more than once"));
            }

            if let Some(flag) = &item.cli_flag {
                for long in cli_longs(item, flag) {
                    if let Some(owner) = flags.insert(long.clone(), &item.name) {
                        return Err(ConfigError::schema(
                            &item.name,
                            format!("CLI flag '--{}' is already used by '{}'", long, owner),
                        ));
                    }
                }
            }

            if let Some(env) = item.env_var(&self.env_prefix) {
                if let Some(owner) = envs.insert(env.clone(), &item.name) {
                    return Err(ConfigError::schema(
                        &item.name,
                        format!("environment variable '{}' is already used by '{}'", env, owner),
                    ));
                }
            }

            for alias in &item.deprecated_names {
                if let Some(owner) = aliases.insert(alias, &item.name) {
                    return Err(ConfigError::schema(
                        &item.name,
                        format!(
                            "deprecated name '{}' already maps onto '{}'",
                            alias.as_str(),
                            owner
                        ),
                    ));
                }
            }

            if !item.default.is_null() {
                let coerced = item.default.clone().coerce(&item.name, item.item_type).map_err(
                    |_| {
                        ConfigError::schema(
                            &item.name,
                            format!("default '{}' is not a valid {}", item.default, item.item_type),
                        )
                    },
                )?;
                if coerced.as_ref() != Some(&item.default) {
                    return Err(ConfigError::schema(
                        &item.name,
                        format!("default '{}' is not a valid {}", item.default, item.item_type),
                    ));
                }
            }
        }

        // Deprecated names must not shadow a canonical name or a live variable.
        for item in &self.items {
            for alias in &item.deprecated_names {
                let clash = match alias {
                    DeprecatedName::Key(key) => names.get(key.as_str()).copied(),
                    DeprecatedName::Env(env) => envs.get(env).copied(),
                };
                if let Some(owner) = clash {
                    return Err(ConfigError::schema(
                        &item.name,
                        format!(
                            "deprecated name '{}' collides with item '{}'",
                            alias.as_str(),
                            owner
                        ),
                    ));
                }
            }
        }

        Ok(Schema::index(self.env_prefix, self.items))
    }
}

/// Long flags an item occupies on the command line.
pub(crate) fn cli_longs(item: &ConfigItem, flag: &str) -> Vec<String> {
    match item.item_type {
        crate::value::ItemType::Bool => vec![flag.to_string(), format!("no-{}", flag)],
        _ => vec![flag.to_string()],
    }
}

/// Append caller-declared items to `base`, failing on any collision.
pub fn extend(base: &Schema, extra: impl IntoIterator<Item = ConfigItem>) -> Result<Schema> {
    base.extend().items(extra).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ItemType, Value};

    fn schema_error_item(err: ConfigError) -> String {
        match err {
            ConfigError::Schema { item, .. } => item,
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_extend_appends_items_and_keeps_base_untouched() {
        let base = base_schema();
        let extended =
            extend(base, [ConfigItem::new("some_parameter", ItemType::Str)]).expect("extend");

        assert_eq!(extended.len(), base.len() + 1);
        assert!(extended.contains("some_parameter"));
        assert!(!base.contains("some_parameter"));
        assert_eq!(extended.items().last().map(|i| i.name.as_str()), Some("some_parameter"));
    }

    #[test]
    fn test_extend_rejects_duplicate_name() {
        let err = extend(base_schema(), [ConfigItem::new("bg_host", ItemType::Str)]).unwrap_err();
        assert_eq!(schema_error_item(err), "bg_host");
    }

    #[test]
    fn test_extend_rejects_alias_shadowing_canonical_name() {
        let item = ConfigItem::new("hostname", ItemType::Str).deprecated_key("bg_host");
        let err = extend(base_schema(), [item]).unwrap_err();
        assert_eq!(schema_error_item(err), "hostname");
    }

    #[test]
    fn test_extend_rejects_alias_claimed_twice() {
        let item =
            ConfigItem::new("web_host", ItemType::Str).no_env().deprecated_env("BG_WEB_HOST");
        let err = extend(base_schema(), [item]).unwrap_err();
        assert_eq!(schema_error_item(err), "web_host");
    }

    #[test]
    fn test_extend_rejects_cli_flag_collision() {
        let item = ConfigItem::new("other_host", ItemType::Str).cli_flag("--bg-host");
        assert!(extend(base_schema(), [item]).is_err());

        // Boolean items also own the negated flag.
        let item = ConfigItem::new("no_ssl", ItemType::Str).cli_flag("no-ssl-enabled");
        assert!(extend(base_schema(), [item]).is_err());
    }

    #[test]
    fn test_extend_rejects_default_of_wrong_type() {
        let item = ConfigItem::new("retries", ItemType::Int).default_value("three");
        let err = extend(base_schema(), [item]).unwrap_err();
        assert_eq!(schema_error_item(err), "retries");

        let item = ConfigItem::new("retries", ItemType::Int).default_value(Value::Int(3));
        assert!(extend(base_schema(), [item]).is_ok());
    }

    #[test]
    fn test_declarations_from_json() {
        let schema = base_schema()
            .extend()
            .declarations(
                r#"{"some_parameter": {
                    "type": "str",
                    "env_name": "SOME_PARAMETER",
                    "apply_env_prefix": false
                }}"#,
            )
            .expect("declarations")
            .build()
            .expect("schema");

        let item = schema.get("some_parameter").expect("declared item");
        assert_eq!(item.env_var(schema.env_prefix()).as_deref(), Some("SOME_PARAMETER"));
    }

    #[test]
    fn test_item_for_key_resolves_deprecated_keys() {
        let schema = base_schema();
        assert_eq!(schema.item_for_key("host").map(|i| i.name.as_str()), Some("bg_host"));
        assert_eq!(schema.item_for_key("bg_port").map(|i| i.name.as_str()), Some("bg_port"));
        assert!(schema.item_for_key("some_parameter").is_none());
    }

    #[test]
    fn test_subset_keeps_schema_order() {
        let subset = base_schema().subset(&["ca_verify", "bg_host"]);
        let names: Vec<_> = subset.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["bg_host", "ca_verify"]);
        assert!(subset.item_for_alias(&DeprecatedName::Env("BG_WEB_HOST".into())).is_some());
    }
}
