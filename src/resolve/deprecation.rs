//! Deprecation mapper: rewrites legacy keys and variables onto canonical item names

use crate::error::{ConfigError, Result};
use crate::schema::{ConfigItem, Schema};
use crate::sources::{RawValueSet, SourceKind};
use crate::value::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The key an item is known by in a given source, if it has one there.
fn canonical_key(schema: &Schema, item: &ConfigItem, kind: SourceKind) -> Option<String> {
    match kind {
        SourceKind::Environment => item.env_var(schema.env_prefix()),
        SourceKind::Cli | SourceKind::Explicit => Some(item.name.clone()),
        SourceKind::Default => None,
    }
}

fn alias_keys(item: &ConfigItem, kind: SourceKind) -> Vec<&str> {
    match kind {
        SourceKind::Environment => item.deprecated_envs().collect(),
        SourceKind::Cli | SourceKind::Explicit => item.deprecated_keys().collect(),
        SourceKind::Default => Vec::new(),
    }
}

/// Re-key one source's values by canonical item name.
///
/// Within the source, a canonical key beats any deprecated one. Without a
/// canonical key, deprecated keys are adopted as long as they agree; differing
/// values are a [`ConfigError::DeprecatedAliasConflict`].
pub fn canonicalize(schema: &Schema, raw: &RawValueSet) -> Result<BTreeMap<String, Value>> {
    let kind = raw.kind();
    let mut canonical = BTreeMap::new();

    for item in schema.items() {
        let aliases: Vec<(&str, &Value)> = alias_keys(item, kind)
            .into_iter()
            .filter_map(|alias| raw.get(alias).map(|value| (alias, value)))
            .collect();

        if let Some(value) = canonical_key(schema, item, kind).and_then(|key| raw.get(&key)) {
            for (alias, _) in &aliases {
                debug!("Ignoring deprecated '{}' in {}: '{}' is also set", alias, kind, item.name);
            }
            canonical.insert(item.name.clone(), value.clone());
            continue;
        }

        // Aliases are compared by their typed value, so `3` and `"3"` agree.
        let mut typed = Vec::with_capacity(aliases.len());
        for (alias, value) in aliases {
            if let Some(coerced) = value.clone().coerce(&item.name, item.item_type)? {
                typed.push((alias, value, coerced));
            }
        }

        let Some((first_alias, first_value, first_typed)) = typed.first() else {
            continue;
        };

        if typed.iter().any(|(_, _, coerced)| coerced != first_typed) {
            return Err(ConfigError::DeprecatedAliasConflict {
                item: item.name.clone(),
                source_name: kind.as_str(),
                aliases: typed.iter().map(|(alias, _, _)| alias.to_string()).collect(),
            });
        }

        for (alias, _, _) in &typed {
            warn!("'{}' is deprecated, use '{}' instead ({})", alias, item.name, kind);
        }
        debug!("Adopting deprecated '{}' as '{}'", first_alias, item.name);
        canonical.insert(item.name.clone(), (*first_value).clone());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::base_schema;
    use crate::value::ItemType;

    fn raw(kind: SourceKind, entries: &[(&str, &str)]) -> RawValueSet {
        let mut set = RawValueSet::new(kind);
        for (key, value) in entries {
            set.insert(*key, Value::from(*value));
        }
        set
    }

    #[test]
    fn test_deprecated_key_adopted_when_canonical_absent() {
        let mapped = canonicalize(
            base_schema(),
            &raw(SourceKind::Explicit, &[("host", "bg_host"), ("port", "1234")]),
        )
        .expect("mapped");
        assert_eq!(mapped.get("bg_host"), Some(&Value::from("bg_host")));
        assert_eq!(mapped.get("bg_port"), Some(&Value::from("1234")));
        assert!(!mapped.contains_key("host"));
    }

    #[test]
    fn test_canonical_key_wins_within_source() {
        let mapped = canonicalize(
            base_schema(),
            &raw(SourceKind::Explicit, &[("host", "old"), ("bg_host", "new")]),
        )
        .expect("mapped");
        assert_eq!(mapped.get("bg_host"), Some(&Value::from("new")));
    }

    #[test]
    fn test_deprecated_env_names() {
        let mapped = canonicalize(
            base_schema(),
            &raw(
                SourceKind::Environment,
                &[
                    ("BG_SSL_CA_CERT", "ca_cert"),
                    ("BG_SSL_CLIENT_CERT", "client_cert"),
                    ("BG_WEB_HOST", "bg_host"),
                    ("BG_WEB_PORT", "1234"),
                ],
            ),
        )
        .expect("mapped");
        assert_eq!(mapped.get("ca_cert"), Some(&Value::from("ca_cert")));
        assert_eq!(mapped.get("client_cert"), Some(&Value::from("client_cert")));
        assert_eq!(mapped.get("bg_host"), Some(&Value::from("bg_host")));
        assert_eq!(mapped.get("bg_port"), Some(&Value::from("1234")));
    }

    #[test]
    fn test_canonical_env_wins_over_deprecated_env() {
        let mapped = canonicalize(
            base_schema(),
            &raw(SourceKind::Environment, &[("BG_HOST", "new"), ("BG_WEB_HOST", "old")]),
        )
        .expect("mapped");
        assert_eq!(mapped.get("bg_host"), Some(&Value::from("new")));
    }

    #[test]
    fn test_env_names_are_not_keys_and_keys_are_not_env_names() {
        // `host` is a deprecated argument key, not an environment variable.
        let env = raw(SourceKind::Environment, &[("host", "h")]);
        assert!(canonicalize(base_schema(), &env).expect("ok").is_empty());

        let explicit = raw(SourceKind::Explicit, &[("BG_WEB_HOST", "h")]);
        assert!(canonicalize(base_schema(), &explicit).expect("ok").is_empty());
    }

    #[test]
    fn test_conflicting_aliases_are_an_error() {
        let schema = Schema::builder("APP_")
            .item(
                ConfigItem::new("endpoint", ItemType::Str)
                    .deprecated_key("url")
                    .deprecated_key("address"),
            )
            .build()
            .expect("schema");

        let conflicting = raw(SourceKind::Explicit, &[("url", "a"), ("address", "b")]);
        let err = canonicalize(&schema, &conflicting).unwrap_err();
        match err {
            ConfigError::DeprecatedAliasConflict { item, source_name, aliases } => {
                assert_eq!(item, "endpoint");
                assert_eq!(source_name, "explicit arguments");
                assert_eq!(aliases, vec!["url".to_string(), "address".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Agreeing aliases are fine.
        let mapped =
            canonicalize(&schema, &raw(SourceKind::Explicit, &[("url", "a"), ("address", "a")]))
                .expect("mapped");
        assert_eq!(mapped.get("endpoint"), Some(&Value::from("a")));

        // And the canonical key settles any disagreement.
        let mapped = canonicalize(
            &schema,
            &raw(SourceKind::Explicit, &[("url", "a"), ("address", "b"), ("endpoint", "c")]),
        )
        .expect("mapped");
        assert_eq!(mapped.get("endpoint"), Some(&Value::from("c")));
    }

    #[test]
    fn test_aliases_agree_after_coercion() {
        let schema = Schema::builder("APP_")
            .item(
                ConfigItem::new("retries", ItemType::Int)
                    .deprecated_key("tries")
                    .deprecated_key("attempts"),
            )
            .build()
            .expect("schema");

        let mut set = RawValueSet::new(SourceKind::Explicit);
        set.insert("tries", Value::Int(3));
        set.insert("attempts", Value::from("3"));
        let mapped = canonicalize(&schema, &set).expect("mapped");
        assert_eq!(mapped.get("retries"), Some(&Value::Int(3)));

        let mut set = RawValueSet::new(SourceKind::Explicit);
        set.insert("tries", Value::Int(3));
        set.insert("attempts", Value::from("4"));
        let err = canonicalize(&schema, &set).unwrap_err();
        assert!(matches!(err, ConfigError::DeprecatedAliasConflict { item, .. } if item == "retries"));
    }
}
