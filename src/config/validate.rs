//! Configuration validation.

use crate::config::Config;
use crate::constants::{MAX_BATCH_SIZE, MIN_MAX_IMAGE_SIZE_MB, MIN_MEMORY_LIMIT_GB, confidence};
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_detection(config)?;
    validate_performance(config)?;
    validate_files(config)?;
    validate_logging(config)?;
    Ok(())
}

/// Validate detection settings.
fn validate_detection(config: &Config) -> Result<()> {
    let detection = &config.detection;

    if !(confidence::MIN..=confidence::MAX).contains(&detection.min_confidence) {
        return Err(Error::ConfigValidation {
            message: format!(
                "min_confidence must be between {} and {}, got {}",
                confidence::MIN,
                confidence::MAX,
                detection.min_confidence
            ),
        });
    }

    validate_batch_size(detection.batch_size)?;

    validate_region(&detection.region)?;

    Ok(())
}

/// Validate a batch size from config or command line.
pub fn validate_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(Error::ConfigValidation {
            message: "batch_size must be at least 1".to_string(),
        });
    }
    if batch_size > MAX_BATCH_SIZE {
        return Err(Error::ConfigValidation {
            message: format!("batch_size must be at most {MAX_BATCH_SIZE}, got {batch_size}"),
        });
    }
    Ok(())
}

/// Validate a geofence region code (three ASCII letters).
pub fn validate_region(region: &str) -> Result<()> {
    if region.len() != 3 || !region.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::ConfigValidation {
            message: format!("region must be an ISO 3166-1 alpha-3 code, got '{region}'"),
        });
    }
    Ok(())
}

fn validate_performance(config: &Config) -> Result<()> {
    let performance = &config.performance;

    if performance.workers == 0 {
        return Err(Error::ConfigValidation {
            message: "workers must be at least 1".to_string(),
        });
    }

    if performance.memory_limit_gb < MIN_MEMORY_LIMIT_GB {
        return Err(Error::ConfigValidation {
            message: format!(
                "memory_limit_gb must be at least {MIN_MEMORY_LIMIT_GB}, got {}",
                performance.memory_limit_gb
            ),
        });
    }

    Ok(())
}

fn validate_files(config: &Config) -> Result<()> {
    let files = &config.files;

    if files.max_image_size_mb < MIN_MAX_IMAGE_SIZE_MB {
        return Err(Error::ConfigValidation {
            message: format!(
                "max_image_size_mb must be at least {MIN_MAX_IMAGE_SIZE_MB}, got {}",
                files.max_image_size_mb
            ),
        });
    }

    if files.supported_formats.is_empty() {
        return Err(Error::ConfigValidation {
            message: "supported_formats must not be empty".to_string(),
        });
    }

    Ok(())
}

fn validate_logging(config: &Config) -> Result<()> {
    if config.logging.max_log_files == 0 {
        return Err(Error::ConfigValidation {
            message: "max_log_files must be at least 1".to_string(),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !["error", "warn", "info", "debug", "trace"].contains(&level.as_str()) {
        return Err(Error::ConfigValidation {
            message: format!("unknown log level '{}'", config.logging.level),
        });
    }

    Ok(())
}
