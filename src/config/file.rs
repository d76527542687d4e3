//! Configuration file loading, saving and maintenance.

use crate::config::{Config, validate_config};
use crate::constants::FILE_TIMESTAMP_FORMAT;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Load configuration from a TOML file.
///
/// Returns default config if the file does not exist.
pub fn load_config_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_config(&contents, path)
}

/// Load configuration from the default platform-specific path.
///
/// Returns default config if no config file exists.
pub fn load_default_config() -> Result<Config> {
    super::config_file_path().map_or_else(|_| Ok(Config::default()), |path| load_config_file(&path))
}

/// Save configuration to a TOML file.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::ConfigWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let contents = toml::to_string_pretty(config).map_err(|e| Error::ConfigSerialize { source: e })?;

    std::fs::write(path, contents).map_err(|e| Error::ConfigWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save configuration to the default platform-specific path.
pub fn save_default_config(config: &Config) -> Result<PathBuf> {
    let path = super::config_file_path()?;
    save_config(config, &path)?;
    Ok(path)
}

/// Overwrite the config file at `path` with defaults.
pub fn reset_config(path: &Path) -> Result<Config> {
    let config = Config::default();
    save_config(&config, path)?;
    info!("Configuration reset to defaults: {}", path.display());
    Ok(config)
}

/// Copy the config file next to itself under a backup name.
///
/// Without `name` the backup is called `config_backup_YYYYmmdd_HHMMSS.toml`.
/// Returns `None` if there is no config file to back up.
pub fn backup_config(path: &Path, name: Option<&str>) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let file_name = name.map_or_else(
        || {
            format!(
                "config_backup_{}.toml",
                chrono::Local::now().format(FILE_TIMESTAMP_FORMAT)
            )
        },
        ToString::to_string,
    );
    let backup_path = path
        .parent()
        .map_or_else(|| PathBuf::from(&file_name), |dir| dir.join(&file_name));

    std::fs::copy(path, &backup_path).map_err(|e| Error::ConfigWrite {
        path: backup_path.clone(),
        source: e,
    })?;
    info!("Configuration backed up to {}", backup_path.display());

    Ok(Some(backup_path))
}

/// Metadata written alongside an exported configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportInfo {
    /// When the export was made (RFC 3339).
    pub export_time: String,
    /// Version of the exporting application.
    pub app_version: String,
    /// Config file the export was taken from.
    pub export_source: String,
}

#[derive(Serialize, Deserialize)]
struct ExportedConfig {
    #[serde(flatten)]
    config: Config,
    #[serde(rename = "_export_info", skip_serializing_if = "Option::is_none", default)]
    export_info: Option<ExportInfo>,
}

/// Export a configuration to `target`, tagged with export metadata.
pub fn export_config(config: &Config, source: &Path, target: &Path) -> Result<()> {
    let exported = ExportedConfig {
        config: config.clone(),
        export_info: Some(ExportInfo {
            export_time: chrono::Local::now().to_rfc3339(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            export_source: source.display().to_string(),
        }),
    };

    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::ConfigWrite {
            path: target.to_path_buf(),
            source: e,
        })?;
    }

    let contents =
        toml::to_string_pretty(&exported).map_err(|e| Error::ConfigSerialize { source: e })?;
    std::fs::write(target, contents).map_err(|e| Error::ConfigWrite {
        path: target.to_path_buf(),
        source: e,
    })?;

    info!("Configuration exported to {}", target.display());
    Ok(())
}

/// Import a configuration file into `path`.
///
/// The imported file is validated first; the current file is kept as
/// `config_before_import.toml` before it is replaced.
pub fn import_config(source: &Path, path: &Path) -> Result<Config> {
    let config = replace_config(source, path, "config_before_import.toml")?;
    info!("Configuration imported from {}", source.display());
    Ok(config)
}

/// Restore a configuration from a backup file into `path`.
///
/// Like [`import_config`], but the current file is kept as
/// `config_before_restore.toml`.
pub fn restore_config(source: &Path, path: &Path) -> Result<Config> {
    let config = replace_config(source, path, "config_before_restore.toml")?;
    info!("Configuration restored from {}", source.display());
    Ok(config)
}

/// Validate `source`, back up `path` under `backup_name`, then replace it.
fn replace_config(source: &Path, path: &Path, backup_name: &str) -> Result<Config> {
    if !source.exists() {
        return Err(Error::ConfigNotFound {
            path: source.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(source).map_err(|e| Error::ConfigRead {
        path: source.to_path_buf(),
        source: e,
    })?;
    let exported: ExportedConfig = toml::from_str(&contents).map_err(|e| Error::ConfigParse {
        path: source.to_path_buf(),
        source: e,
    })?;

    if let Some(ref export_info) = exported.export_info {
        info!("Configuration was exported from {}", export_info.export_source);
    }

    validate_config(&exported.config)?;
    backup_config(path, Some(backup_name))?;
    save_config(&exported.config, path)?;
    Ok(exported.config)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let exported: ExportedConfig = toml::from_str(contents).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(exported.config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_nonexistent_file_returns_default() {
        let path = Path::new("/nonexistent/path/config.toml");
        let config = load_config_file(path).unwrap();
        assert_eq!(config.detection.batch_size, 32);
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[detection]
min_confidence = 0.25
region = "USA"

[performance]
workers = 2
"#
        )
        .unwrap();

        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config.detection.min_confidence, 0.25);
        assert_eq!(config.detection.region, "USA");
        assert_eq!(config.performance.workers, 2);
        assert_eq!(config.detection.batch_size, 32);
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();

        let config = load_config_file(file.path());
        assert!(matches!(config, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_save_then_load_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.detection.batch_size = 16;
        config.detection.min_confidence = 0.2;
        save_config(&config, &path).unwrap();

        let loaded = load_config_file(&path).unwrap();
        assert_eq!(loaded.detection.batch_size, 16);
        assert_eq!(loaded.detection.min_confidence, 0.2);
    }

    #[test]
    fn test_backup_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        let result = backup_config(&dir.path().join("config.toml"), None).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_backup_uses_timestamped_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        save_config(&Config::default(), &path).unwrap();

        let backup = backup_config(&path, None).unwrap().unwrap();
        let name = backup.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("config_backup_"));
        assert!(name.ends_with(".toml"));
        assert!(backup.exists());
    }

    #[test]
    fn test_export_then_import_round_trip() {
        let dir = TempDir::new().unwrap();
        let active = dir.path().join("config.toml");
        let exported = dir.path().join("export").join("shared.toml");

        let mut config = Config::default();
        config.performance.workers = 8;
        save_config(&Config::default(), &active).unwrap();
        export_config(&config, &active, &exported).unwrap();

        let text = std::fs::read_to_string(&exported).unwrap();
        assert!(text.contains("_export_info"));

        let imported = import_config(&exported, &active).unwrap();
        assert_eq!(imported.performance.workers, 8);
        assert!(dir.path().join("config_before_import.toml").exists());
        assert_eq!(load_config_file(&active).unwrap().performance.workers, 8);
    }

    #[test]
    fn test_import_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("bad.toml");
        std::fs::write(&source, "[detection]\nbatch_size = 0\n").unwrap();

        let result = import_config(&source, &dir.path().join("config.toml"));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_restore_from_backup_keeps_previous() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.detection.region = "USA".to_string();
        save_config(&config, &path).unwrap();
        let backup = backup_config(&path, None).unwrap().unwrap();
        reset_config(&path).unwrap();

        let restored = restore_config(&backup, &path).unwrap();
        assert_eq!(restored.detection.region, "USA");
        assert_eq!(load_config_file(&path).unwrap().detection.region, "USA");

        let previous = dir.path().join("config_before_restore.toml");
        assert_eq!(load_config_file(&previous).unwrap().detection.region, "JPN");
    }

    #[test]
    fn test_restore_missing_backup() {
        let dir = TempDir::new().unwrap();
        let result = restore_config(&dir.path().join("gone.toml"), &dir.path().join("config.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
    }

    #[test]
    fn test_reset_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[detection]\nbatch_size = 4\n").unwrap();

        reset_config(&path).unwrap();
        assert_eq!(load_config_file(&path).unwrap().detection.batch_size, 32);
    }
}
