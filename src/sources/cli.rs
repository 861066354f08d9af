//! Command-line collector
//!
//! Every CLI-visible schema item becomes a long flag. Boolean items get a
//! `--flag` / `--no-flag` pair where the last one given wins.
//!
//! Host applications can take the parser from [`argument_parser`], add their own
//! arguments, and hand it back; the engine then parses the whole argument vector
//! with it and only reads the schema's arguments out of the result. Without a
//! host parser, tokens the schema does not recognize are set aside untouched.

use super::{RawValueSet, SourceKind};
use crate::error::Result;
use crate::schema::{ConfigItem, Schema};
use crate::value::{ItemType, Value};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::HashSet;
use tracing::debug;

/// Result of the command-line pass.
#[derive(Debug, Clone)]
pub struct CliCollection {
    pub values: RawValueSet,
    /// Full parse result, including any host-defined arguments.
    pub matches: ArgMatches,
    /// Tokens no parser claimed. Always empty when a host parser was used.
    pub passthrough: Vec<String>,
}

/// Build a fresh parser carrying one argument per CLI-visible schema item.
pub fn argument_parser(schema: &Schema) -> Command {
    add_arguments(schema, Command::new(env!("CARGO_PKG_NAME")))
}

/// Add the schema's arguments to `cmd`, leaving any argument it already defines alone.
///
/// An argument is already defined when `cmd` has one with the same id or the
/// same long flag.
pub fn add_arguments(schema: &Schema, mut cmd: Command) -> Command {
    let ids: HashSet<String> =
        cmd.get_arguments().map(|arg| arg.get_id().as_str().to_string()).collect();
    let longs: HashSet<String> =
        cmd.get_arguments().filter_map(|arg| arg.get_long()).map(str::to_string).collect();

    for item in schema.items() {
        let Some(flag) = item.cli_flag.as_deref() else {
            continue;
        };
        let args = schema_args(item, flag);
        let taken: Vec<bool> = args
            .iter()
            .map(|arg| {
                ids.contains(arg.get_id().as_str())
                    || arg.get_long().is_some_and(|long| longs.contains(long))
            })
            .collect();

        // A `--no-` partner may only override an id that ends up in the command.
        let orphaned = args
            .iter()
            .zip(&taken)
            .any(|(arg, taken)| *taken && !ids.contains(arg.get_id().as_str()));

        for (arg, taken) in args.into_iter().zip(taken) {
            if taken {
                debug!("Leaving --{} to the host parser", arg.get_long().unwrap_or(flag));
                continue;
            }
            cmd = cmd.arg(if orphaned { arg.overrides_with(clap::builder::Resettable::<clap::Id>::from(None)) } else { arg });
        }
    }
    cmd
}

fn negated_id(item: &ConfigItem) -> String {
    format!("no_{}", item.name)
}

fn schema_args(item: &ConfigItem, flag: &str) -> Vec<Arg> {
    match item.item_type {
        ItemType::Bool => vec![
            Arg::new(item.name.clone())
                .long(flag.to_string())
                .action(ArgAction::SetTrue)
                .overrides_with(negated_id(item))
                .help(item.description.clone()),
            Arg::new(negated_id(item))
                .long(format!("no-{}", flag))
                .action(ArgAction::SetTrue)
                .overrides_with(item.name.clone())
                .help(format!("Disable --{}", flag)),
        ],
        _ => vec![Arg::new(item.name.clone())
            .long(flag.to_string())
            .value_name(item.name.to_ascii_uppercase())
            .action(ArgAction::Set)
            .allow_negative_numbers(true)
            .help(item.description.clone())],
    }
}

/// Parse `args` (without a program name) and collect the schema's values.
pub fn collect(schema: &Schema, args: &[String], parser: Option<Command>) -> Result<CliCollection> {
    let (to_parse, passthrough, cmd) = match parser {
        Some(parser) => (args.to_vec(), Vec::new(), add_arguments(schema, parser)),
        None => {
            let (recognized, passthrough) = split_args(schema, args);
            (recognized, passthrough, argument_parser(schema))
        }
    };

    if !passthrough.is_empty() {
        debug!("Passing through unrecognized arguments: {:?}", passthrough);
    }

    let matches = cmd.no_binary_name(true).try_get_matches_from(&to_parse)?;
    let values = values_from_matches(schema, &matches);

    Ok(CliCollection { values, matches, passthrough })
}

/// Read the schema's values out of a parse result, keyed by item name.
pub(crate) fn values_from_matches(schema: &Schema, matches: &ArgMatches) -> RawValueSet {
    let mut raw = RawValueSet::new(SourceKind::Cli);

    for item in schema.items().iter().filter(|item| item.cli_flag.is_some()) {
        let value = match item.item_type {
            // A host may define the positive flag as taking a value.
            ItemType::Bool if supplied(matches, &item.name) => {
                match raw_string(matches, &item.name) {
                    Some(raw) if raw != "true" => Some(Value::Str(raw)),
                    _ => Some(Value::Bool(true)),
                }
            }
            ItemType::Bool if supplied(matches, &negated_id(item)) => Some(Value::Bool(false)),
            ItemType::Bool => None,
            _ => raw_string(matches, &item.name).map(Value::Str),
        };

        if let Some(value) = value {
            debug!("Command line configuration {}={}", item.name, item.display_value(&value));
            raw.insert(item.name.clone(), value);
        }
    }

    raw
}

fn supplied(matches: &ArgMatches, id: &str) -> bool {
    matches.try_contains_id(id).unwrap_or(false)
        && matches.value_source(id) == Some(ValueSource::CommandLine)
}

fn raw_string(matches: &ArgMatches, id: &str) -> Option<String> {
    if !supplied(matches, id) {
        return None;
    }
    let mut values = matches.try_get_raw(id).ok()??;
    values.next().map(|v| v.to_string_lossy().into_owned())
}

/// Separate the tokens the schema recognizes from everything else.
fn split_args(schema: &Schema, args: &[String]) -> (Vec<String>, Vec<String>) {
    let mut takes_value = HashSet::new();
    let mut switches = HashSet::new();
    for item in schema.items() {
        let Some(flag) = item.cli_flag.as_deref() else {
            continue;
        };
        if item.item_type == ItemType::Bool {
            switches.insert(flag.to_string());
            switches.insert(format!("no-{}", flag));
        } else {
            takes_value.insert(flag.to_string());
        }
    }

    let mut recognized = Vec::new();
    let mut passthrough = Vec::new();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            passthrough.push(arg.clone());
            passthrough.extend(iter.cloned());
            break;
        }

        let Some(long) = arg.strip_prefix("--") else {
            passthrough.push(arg.clone());
            continue;
        };
        let (name, inline_value) = match long.split_once('=') {
            Some((name, _)) => (name, true),
            None => (long, false),
        };

        if takes_value.contains(name) {
            recognized.push(arg.clone());
            if !inline_value {
                if let Some(value) = iter.next_if(|next| !next.starts_with("--")) {
                    recognized.push(value.clone());
                }
            }
        } else if switches.contains(name) {
            recognized.push(arg.clone());
        } else {
            passthrough.push(arg.clone());
        }
    }

    (recognized, passthrough)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::resolve::deprecation::canonicalize;
    use crate::resolve::Layer;
    use crate::schema::base_schema;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_collects_value_flags() {
        let cli = collect(base_schema(), &args(&["--bg-host", "the_host", "--bg-port=1234"]), None)
            .expect("cli");
        assert_eq!(cli.values.get("bg_host"), Some(&Value::from("the_host")));
        assert_eq!(cli.values.get("bg_port"), Some(&Value::from("1234")));
        assert!(cli.passthrough.is_empty());
    }

    #[test]
    fn test_boolean_flag_pair_last_wins() {
        let cli = collect(base_schema(), &args(&["--no-ssl-enabled", "--ca-verify"]), None)
            .expect("cli");
        assert_eq!(cli.values.get("ssl_enabled"), Some(&Value::Bool(false)));
        assert_eq!(cli.values.get("ca_verify"), Some(&Value::Bool(true)));

        let cli = collect(base_schema(), &args(&["--no-ssl-enabled", "--ssl-enabled"]), None)
            .expect("cli");
        assert_eq!(cli.values.get("ssl_enabled"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_absent_flags_are_not_collected() {
        let cli = collect(base_schema(), &[], None).expect("cli");
        assert!(cli.values.is_empty());
    }

    #[test]
    fn test_unrecognized_tokens_pass_through() {
        let cli = collect(
            base_schema(),
            &args(&["param", "--bg-host", "the_host", "--custom", "x", "-v"]),
            None,
        )
        .expect("cli");
        assert_eq!(cli.values.get("bg_host"), Some(&Value::from("the_host")));
        assert_eq!(cli.passthrough, args(&["param", "--custom", "x", "-v"]));
    }

    #[test]
    fn test_missing_value_is_a_cli_error() {
        let err =
            collect(base_schema(), &args(&["--bg-host", "--bg-port", "1"]), None).unwrap_err();
        assert!(matches!(err, ConfigError::Cli(_)));
    }

    #[test]
    fn test_negative_number_is_a_value() {
        let cli = collect(base_schema(), &args(&["--client-timeout", "-1"]), None).expect("cli");
        assert_eq!(cli.values.get("client_timeout"), Some(&Value::from("-1")));
    }

    #[test]
    fn test_host_parser_with_positional() {
        let parser = argument_parser(base_schema()).arg(Arg::new("some_parameter"));
        let cli = collect(base_schema(), &args(&["param", "--bg-host", "the_host"]), Some(parser))
            .expect("cli");

        assert_eq!(cli.values.get("bg_host"), Some(&Value::from("the_host")));
        assert!(!cli.values.contains_key("some_parameter"));
        assert_eq!(
            cli.matches.get_one::<String>("some_parameter").map(String::as_str),
            Some("param")
        );
    }

    #[test]
    fn test_host_parser_without_schema_arguments_is_augmented() {
        let parser = Command::new("host-app")
            .arg(Arg::new("verbose").long("verbose").action(ArgAction::SetTrue));
        let cli = collect(base_schema(), &args(&["--verbose", "--bg-host", "h"]), Some(parser))
            .expect("cli");
        assert_eq!(cli.values.get("bg_host"), Some(&Value::from("h")));
        assert!(cli.matches.get_flag("verbose"));
    }

    #[test]
    fn test_host_parser_keeps_its_own_definition() {
        let parser = Command::new("host-app")
            .arg(Arg::new("bg_host").long("host-name").default_value("from-default"));
        let cli = collect(base_schema(), &args(&["--host-name", "h"]), Some(parser)).expect("cli");
        assert_eq!(cli.values.get("bg_host"), Some(&Value::from("h")));

        // A default value on the host's argument does not count as supplied.
        let parser = Command::new("host-app")
            .arg(Arg::new("bg_host").long("host-name").default_value("from-default"));
        let cli = collect(base_schema(), &[], Some(parser)).expect("cli");
        assert!(!cli.values.contains_key("bg_host"));
    }

    #[test]
    fn test_host_boolean_with_value_is_read() {
        let parser = Command::new("host-app")
            .arg(Arg::new("ssl_enabled").long("ssl-enabled").action(ArgAction::Set));
        let cli = collect(
            base_schema(),
            &args(&["--bg-host", "h", "--ssl-enabled", "false"]),
            Some(parser),
        )
        .expect("cli");
        assert_eq!(cli.values.get("ssl_enabled"), Some(&Value::from("false")));

        let canonical = canonicalize(base_schema(), &cli.values).expect("canonical");
        let layer = Layer::coerce(base_schema(), SourceKind::Cli, canonical).expect("layer");
        assert_eq!(layer.values.get("ssl_enabled"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_host_long_flag_is_not_redefined() {
        let parser = Command::new("host-app").arg(Arg::new("host").long("bg-host"));
        let cli = collect(base_schema(), &args(&["--bg-host", "h"]), Some(parser)).expect("cli");
        assert!(!cli.values.contains_key("bg_host"));
        assert_eq!(cli.matches.get_one::<String>("host").map(String::as_str), Some("h"));

        let parser = Command::new("host-app")
            .arg(Arg::new("tls").long("ssl-enabled").action(ArgAction::SetTrue));
        let cli =
            collect(base_schema(), &args(&["--no-ssl-enabled"]), Some(parser)).expect("cli");
        assert_eq!(cli.values.get("ssl_enabled"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_hidden_items_have_no_flag() {
        let schema = Schema::builder("BG_")
            .item(ConfigItem::new("internal", ItemType::Str).no_cli())
            .build()
            .expect("schema");
        let cli = collect(&schema, &args(&["--internal", "x"]), None).expect("cli");
        assert!(cli.values.is_empty());
        assert_eq!(cli.passthrough, args(&["--internal", "x"]));
    }
}
