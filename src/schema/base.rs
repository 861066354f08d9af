//! Built-in Beer Garden client items

use super::item::{ConfigItem, Normalization};
use super::Schema;
use crate::value::{ItemType, Value};
use once_cell::sync::Lazy;

pub const ENV_PREFIX: &str = "BG_";

/// Items that make up the connection info handed to the REST client.
pub const CONNECTION_ITEMS: &[&str] = &[
    "bg_host",
    "bg_port",
    "ssl_enabled",
    "api_version",
    "ca_cert",
    "client_cert",
    "url_prefix",
    "ca_verify",
    "username",
    "password",
    "access_token",
    "refresh_token",
];

static BASE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::builder(ENV_PREFIX)
        .items(base_items())
        .build()
        .expect("built-in schema is valid")
});

static CONNECTION_SCHEMA: Lazy<Schema> = Lazy::new(|| BASE_SCHEMA.subset(CONNECTION_ITEMS));

pub fn base_schema() -> &'static Schema {
    &BASE_SCHEMA
}

pub fn connection_schema() -> &'static Schema {
    &CONNECTION_SCHEMA
}

fn base_items() -> Vec<ConfigItem> {
    vec![
        // ── Connection ───────────────────────────────────────────────────────────
        ConfigItem::new("bg_host", ItemType::Str)
            .description("Beer Garden hostname")
            .env_name("HOST")
            .required(true)
            .deprecated_key("host")
            .deprecated_env("BG_WEB_HOST"),
        ConfigItem::new("bg_port", ItemType::Int)
            .description("Beer Garden port")
            .default_value(Value::Int(2337))
            .env_name("PORT")
            .deprecated_key("port")
            .deprecated_env("BG_WEB_PORT"),
        ConfigItem::new("ssl_enabled", ItemType::Bool)
            .description("Use SSL when communicating with Beer Garden")
            .default_value(true),
        ConfigItem::new("api_version", ItemType::Int)
            .description("Beer Garden API version to use (latest when unset)"),
        ConfigItem::new("ca_cert", ItemType::Str)
            .description("CA certificate to use when verifying the server certificate")
            .deprecated_env("BG_SSL_CA_CERT"),
        ConfigItem::new("client_cert", ItemType::Str)
            .description("Client certificate to present to Beer Garden")
            .deprecated_env("BG_SSL_CLIENT_CERT"),
        ConfigItem::new("url_prefix", ItemType::Str)
            .description("URL path prefix Beer Garden is served under")
            .normalize(Normalization::UrlPrefix),
        ConfigItem::new("ca_verify", ItemType::Bool)
            .description("Verify the server certificate against the CA certificate")
            .default_value(true),
        // ── Authentication ───────────────────────────────────────────────────────
        ConfigItem::new("username", ItemType::Str).description("Username for authentication"),
        ConfigItem::new("password", ItemType::Str)
            .description("Password for authentication")
            .secret(true),
        ConfigItem::new("access_token", ItemType::Str)
            .description("Access token for authentication")
            .secret(true),
        ConfigItem::new("refresh_token", ItemType::Str)
            .description("Refresh token for authentication")
            .secret(true),
        // ── Client behaviour ─────────────────────────────────────────────────────
        ConfigItem::new("client_timeout", ItemType::Float)
            .description("Seconds to wait for a response (negative or unset waits forever)"),
        ConfigItem::new("log_level", ItemType::Str)
            .description("Log level for the client")
            .default_value("INFO"),
    ]
}
