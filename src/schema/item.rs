//! Declarative description of a single configuration item

use crate::value::{ItemType, Value};
use serde::Deserialize;

/// A legacy name that still maps onto a canonical item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeprecatedName {
    /// Old explicit-argument key, e.g. `host` for `bg_host`.
    Key(String),
    /// Old environment variable, spelled out in full, e.g. `BG_WEB_HOST`.
    Env(String),
}

impl DeprecatedName {
    pub fn as_str(&self) -> &str {
        match self {
            DeprecatedName::Key(s) | DeprecatedName::Env(s) => s,
        }
    }
}

/// Post-merge cleanup applied to an item's resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Force a single leading and trailing `/` and collapse repeated slashes.
    UrlPrefix,
}

/// One schema entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigItem {
    pub name: String,
    pub item_type: ItemType,
    pub default: Value,
    pub description: String,
    /// Long flag without the leading dashes. `None` hides the item from the CLI.
    pub cli_flag: Option<String>,
    /// Explicit environment name. When `None` the upper-cased item name is used.
    pub env_name: Option<String>,
    pub apply_env_prefix: bool,
    pub from_env: bool,
    pub deprecated_names: Vec<DeprecatedName>,
    pub required: bool,
    pub secret: bool,
    pub normalize: Option<Normalization>,
}

impl ConfigItem {
    /// Create an optional, CLI- and environment-visible item with a null default.
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        let name = name.into();
        Self {
            cli_flag: Some(name.replace('_', "-")),
            name,
            item_type,
            default: Value::Null,
            description: String::new(),
            env_name: None,
            apply_env_prefix: true,
            from_env: true,
            deprecated_names: Vec::new(),
            required: false,
            secret: false,
            normalize: None,
        }
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn cli_flag(mut self, flag: impl Into<String>) -> Self {
        self.cli_flag = Some(flag.into().trim_start_matches('-').to_string());
        self
    }

    pub fn no_cli(mut self) -> Self {
        self.cli_flag = None;
        self
    }

    pub fn env_name(mut self, env_name: impl Into<String>) -> Self {
        self.env_name = Some(env_name.into());
        self
    }

    pub fn apply_env_prefix(mut self, apply: bool) -> Self {
        self.apply_env_prefix = apply;
        self
    }

    pub fn no_env(mut self) -> Self {
        self.from_env = false;
        self
    }

    pub fn deprecated_key(mut self, key: impl Into<String>) -> Self {
        self.deprecated_names.push(DeprecatedName::Key(key.into()));
        self
    }

    pub fn deprecated_env(mut self, env_name: impl Into<String>) -> Self {
        self.deprecated_names.push(DeprecatedName::Env(env_name.into()));
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }

    pub fn normalize(mut self, normalization: Normalization) -> Self {
        self.normalize = Some(normalization);
        self
    }

    /// Full environment variable name for this item, if it is read from the environment.
    pub fn env_var(&self, prefix: &str) -> Option<String> {
        if !self.from_env {
            return None;
        }
        let base = self.env_name.clone().unwrap_or_else(|| self.name.to_ascii_uppercase());
        if self.apply_env_prefix {
            Some(format!("{}{}", prefix, base))
        } else {
            Some(base)
        }
    }

    pub fn deprecated_keys(&self) -> impl Iterator<Item = &str> {
        self.deprecated_names.iter().filter_map(|d| match d {
            DeprecatedName::Key(k) => Some(k.as_str()),
            DeprecatedName::Env(_) => None,
        })
    }

    pub fn deprecated_envs(&self) -> impl Iterator<Item = &str> {
        self.deprecated_names.iter().filter_map(|d| match d {
            DeprecatedName::Env(e) => Some(e.as_str()),
            DeprecatedName::Key(_) => None,
        })
    }

    /// Render a value of this item for logs, masking secrets.
    pub fn display_value(&self, value: &Value) -> String {
        if self.secret && !value.is_null() {
            "****".to_string()
        } else {
            value.to_string()
        }
    }
}

fn default_true() -> bool {
    true
}

/// Caller-supplied item declaration, as read from JSON.
///
/// ```json
/// {"type": "str", "env_name": "SOME_PARAMETER", "apply_env_prefix": false}
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemDeclaration {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default)]
    pub default: Value,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cli_name: Option<String>,
    #[serde(default = "default_true")]
    pub cli: bool,
    #[serde(default)]
    pub env_name: Option<String>,
    #[serde(default = "default_true")]
    pub apply_env_prefix: bool,
    #[serde(default = "default_true")]
    pub env: bool,
    #[serde(default)]
    pub deprecated_names: Vec<String>,
    #[serde(default)]
    pub deprecated_env_names: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub secret: bool,
    #[serde(default)]
    pub normalize: Option<Normalization>,
}

impl ItemDeclaration {
    pub fn into_item(self, name: impl Into<String>) -> ConfigItem {
        let mut item = ConfigItem::new(name, self.item_type)
            .default_value(self.default)
            .description(self.description)
            .apply_env_prefix(self.apply_env_prefix)
            .required(self.required)
            .secret(self.secret);

        item.normalize = self.normalize;
        item.env_name = self.env_name;
        if let Some(flag) = self.cli_name {
            item = item.cli_flag(flag);
        }
        if !self.cli {
            item = item.no_cli();
        }
        if !self.env {
            item = item.no_env();
        }
        for key in self.deprecated_names {
            item = item.deprecated_key(key);
        }
        for env_name in self.deprecated_env_names {
            item = item.deprecated_env(env_name);
        }
        item
    }
}
