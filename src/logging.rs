//! Logging setup: console output plus an optional per-user log file.

use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Console filter for the given verbosity.
///
/// `RUST_LOG` takes precedence when set.
pub fn console_filter(verbose: u8, quiet: bool, base_level: &str) -> String {
    if quiet {
        return "warn".to_string();
    }
    match verbose {
        0 => base_level.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Path of the `n`-th rotated log file (`name.log.n`).
fn rotated(path: &Path, n: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

/// Rotate existing log files so at most `max_files` remain after a new log
/// is started (the current file plus `max_files - 1` rotated ones).
pub fn rotate_logs(path: &Path, max_files: usize) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let keep = max_files.saturating_sub(1);
    if keep == 0 {
        std::fs::remove_file(path)?;
        return Ok(());
    }

    let oldest = rotated(path, keep);
    if oldest.exists() {
        std::fs::remove_file(&oldest)?;
    }
    for n in (1..keep).rev() {
        let from = rotated(path, n);
        if from.exists() {
            std::fs::rename(&from, rotated(path, n + 1))?;
        }
    }
    std::fs::rename(path, rotated(path, 1))?;
    Ok(())
}

/// Rotate previous logs and open a fresh log file.
pub fn open_log_file(path: &Path, max_files: usize) -> Result<File> {
    let log_error = |e| Error::LogFile {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(log_error)?;
    }
    rotate_logs(path, max_files)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(log_error)
}

/// Install the global subscriber.
///
/// Returns the log file path when file logging is active.
pub fn init_logging(
    verbose: u8,
    quiet: bool,
    config: &LoggingConfig,
    log_file: Option<&Path>,
) -> Result<Option<PathBuf>> {
    let console = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(console_filter(verbose, quiet, &config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    });
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console);

    let (file_layer, file_path) = match log_file.filter(|_| config.log_to_file) {
        Some(path) => {
            let file = open_log_file(path, config.max_log_files)?;
            let level = if verbose > 0 {
                console_filter(verbose, false, &config.level)
            } else {
                config.level.clone()
            };
            let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(filter);
            (Some(layer), Some(path.to_path_buf()))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Internal {
            message: format!("failed to install logger: {e}"),
        })?;

    Ok(file_path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_console_filter() {
        assert_eq!(console_filter(0, true, "info"), "warn");
        assert_eq!(console_filter(0, false, "info"), "info");
        assert_eq!(console_filter(1, false, "info"), "debug");
        assert_eq!(console_filter(3, false, "info"), "trace");
    }

    #[test]
    fn test_rotate_logs_keeps_limit() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("app.log");

        for run in 0..5 {
            let mut file = open_log_file(&log, 3).unwrap();
            std::io::Write::write_all(&mut file, format!("run {run}").as_bytes()).unwrap();
        }

        assert_eq!(std::fs::read_to_string(&log).unwrap(), "run 4");
        assert_eq!(std::fs::read_to_string(rotated(&log, 1)).unwrap(), "run 3");
        assert_eq!(std::fs::read_to_string(rotated(&log, 2)).unwrap(), "run 2");
        assert!(!rotated(&log, 3).exists());
    }

    #[test]
    fn test_rotate_logs_single_file() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("app.log");
        std::fs::write(&log, "old").unwrap();

        rotate_logs(&log, 1).unwrap();
        assert!(!log.exists());
        assert!(!rotated(&log, 1).exists());
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("logs").join("app.log");
        open_log_file(&log, 10).unwrap();
        assert!(log.exists());
    }
}
