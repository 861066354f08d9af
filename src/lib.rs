//! bg-config: resolve Beer Garden client configuration
//!
//! Values come from explicit caller arguments, the command line, environment
//! variables and schema defaults. They are merged with a fixed precedence
//! (explicit > CLI > environment > default), legacy names are mapped onto their
//! canonical items, and the result is normalized and validated.
//!
//! ```no_run
//! use bg_config::{get_connection_info, ExplicitArgs};
//!
//! let config = get_connection_info(ExplicitArgs::new().set("bg_host", "localhost"))?;
//! assert_eq!(config.bg_host(), Some("localhost"));
//! # Ok::<(), bg_config::ConfigError>(())
//! ```

pub mod error;
pub mod resolve;
pub mod schema;
pub mod sources;
pub mod value;

pub use error::{ConfigError, Result};
pub use resolve::{
    get_connection_info, load_config, resolve_connection_info, resolve_full_config, ConfigLoader,
    ConnectionInfo, Resolution, ResolvedConfig,
};
pub use schema::{base_schema, connection_schema, ConfigItem, Schema, SchemaBuilder};
pub use sources::{add_arguments, argument_parser, EnvSnapshot, ExplicitArgs};
pub use value::{ItemType, Value};
