pub mod types;

use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

pub use types::Config;

const CONFIG_FILE_NAME: &str = ".kubeaudit.toml";

/// Get the global config file path (~/.kubeaudit.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (dir/.kubeaudit.toml)
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load configuration from an explicit file, or look for one in the current
/// directory and then the home directory. Defaults when none exists.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().ok();
    let home = global_config_path();
    load_config_from(explicit, cwd.as_deref(), home.as_deref())
}

fn load_config_from(
    explicit: Option<&Path>,
    cwd: Option<&Path>,
    global: Option<&Path>,
) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    // Try local config first
    if let Some(local) = cwd.map(local_config_path) {
        if local.is_file() {
            return read_config(&local);
        }
    }

    if let Some(global) = global {
        if global.is_file() {
            return read_config(global);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded configuration from {}", path.display());
    Ok(config)
}
