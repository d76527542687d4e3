//! Platform-specific configuration, log and output paths.

use crate::constants::{APP_NAME, CONFIG_ENV_VAR, DEFAULT_OUTPUT_SUBDIR, LOG_FILE_NAME};
use crate::error::{Error, Result};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Get the configuration directory for the current platform.
///
/// - Linux: `~/.config/wildlife-detector/`
/// - macOS: `~/Library/Application Support/wildlife-detector/`
/// - Windows: `%APPDATA%\wildlife-detector\`
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the config file.
///
/// `WILDLIFE_DETECTOR_CONFIG` takes precedence over the platform default.
pub fn config_file_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    Ok(config_dir()?.join("config.toml"))
}

/// Directory holding the log files.
///
/// - Linux: `~/.local/share/wildlife-detector/logs/`
/// - macOS: `~/Library/Application Support/wildlife-detector/logs/`
/// - Windows: `%LOCALAPPDATA%\wildlife-detector\data\logs\`
pub fn log_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .ok_or(Error::DataDirNotFound)
}

/// Full path of the active log file.
pub fn log_file_path() -> Result<PathBuf> {
    Ok(log_dir()?.join(LOG_FILE_NAME))
}

/// Default output directory (`~/WildlifeDetector/Output`).
pub fn default_output_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().ok_or(Error::HomeDirNotFound)?;
    Ok(DEFAULT_OUTPUT_SUBDIR
        .iter()
        .fold(base.home_dir().to_path_buf(), |acc, part| acc.join(part)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_returns_path() {
        let path = config_dir().unwrap();
        assert!(path.to_string_lossy().contains("wildlife-detector"));
    }

    #[test]
    fn test_config_file_path_ends_with_toml() {
        if std::env::var_os(CONFIG_ENV_VAR).is_some() {
            return;
        }
        let path = config_file_path().unwrap();
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_log_file_path_name() {
        let path = log_file_path().unwrap();
        assert!(path.ends_with(LOG_FILE_NAME));
        assert!(path.parent().unwrap().ends_with("logs"));
    }

    #[test]
    fn test_default_output_dir_layout() {
        let path = default_output_dir().unwrap();
        assert!(path.ends_with("WildlifeDetector/Output"));
    }
}
