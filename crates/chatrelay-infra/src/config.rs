//! Configuration loading from the data directory.
//!
//! Reads `{data_dir}/config.toml` if present. A missing or unreadable file
//! yields the built-in defaults; a file that fails to parse is logged and
//! ignored rather than aborting startup.

use chatrelay_types::config::Config;
use std::path::PathBuf;

/// Resolve the data directory for config and database files.
///
/// Honors `CHATRELAY_DATA_DIR` when set, otherwise `~/.chatrelay`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHATRELAY_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".chatrelay")
}

/// Load configuration from `{data_dir}/config.toml`, falling back to
/// defaults when the file is absent or invalid.
pub fn load_config() -> Config {
    let path = resolve_data_dir().join("config.toml");
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(_) => return Config::default(),
    };
    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "invalid config file, using defaults"
            );
            Config::default()
        }
    }
}
