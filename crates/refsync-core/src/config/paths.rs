//! Config path resolution helpers.

use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "refsync.toml";

/// `<config dir>/refsync/refsync.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("refsync").join(CONFIG_FILE_NAME))
}
