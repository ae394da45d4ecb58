//! Configuration loading and data folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Name of the SQLite database file inside the data folder
const DATABASE_FILE: &str = "clips.db";

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. CLIPSTREAM_DATA_DIR environment variable
/// 3. TOML config file (`data_dir` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_dir(cli_arg: Option<&str>) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("CLIPSTREAM_DATA_DIR") {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = load_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_dir) = config.get("data_dir").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(data_dir));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(get_default_data_dir())
}

/// Path of the clips database inside the data folder
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATABASE_FILE)
}

/// Get default configuration file path for the platform
fn load_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/clipstream/config.toml first, then /etc/clipstream/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("clipstream").join("config.toml"));
        let system_config = PathBuf::from("/etc/clipstream/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("clipstream").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!(
            "Config file not found: {:?}",
            config_path
        )))
    }
}

/// Get OS-dependent default data folder path
fn get_default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("clipstream"))
        .unwrap_or_else(|| PathBuf::from("./clipstream_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arg_takes_priority() {
        let resolved = resolve_data_dir(Some("/tmp/clipstream-cli")).unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/clipstream-cli"));
    }

    #[test]
    fn test_database_path_joins_file_name() {
        let path = database_path(Path::new("/var/lib/clipstream"));
        assert_eq!(path, PathBuf::from("/var/lib/clipstream/clips.db"));
    }

    #[test]
    fn test_default_resolution_returns_some_path() {
        // No CLI arg; result depends on environment but must be non-empty
        let resolved = resolve_data_dir(None).unwrap();
        assert!(!resolved.as_os_str().is_empty());
    }
}
