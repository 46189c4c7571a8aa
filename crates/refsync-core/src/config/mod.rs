//! Configuration file support.
//!
//! A `refsync.toml` file supplies the source, checkout options and
//! credentials; command line values override it.

pub mod parser;
pub mod paths;
pub mod schema;

pub use parser::{load_config, parse_refsync_toml, parse_refsync_toml_str};
pub use paths::{CONFIG_FILE_NAME, default_config_path};
pub use schema::{AuthConfig, RefsyncConfig, SourceConfig};
