//! CLI argument validators.
//!
//! Shared validation functions for CLI argument parsing.

use crate::config::{validate_batch_size, validate_region};

/// Parse and validate confidence value (0.0-1.0).
pub fn parse_confidence(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(0.0..=1.0).contains(&value) {
        return Err(format!(
            "confidence must be between 0.0 and 1.0, got {value}"
        ));
    }

    Ok(value)
}

/// Parse and validate a batch size.
pub fn parse_batch_size(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    validate_batch_size(value).map_err(|e| e.to_string())?;
    Ok(value)
}

/// Parse and validate a worker count (at least 1).
pub fn parse_workers(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value == 0 {
        return Err("workers must be at least 1".to_string());
    }
    Ok(value)
}

/// Parse and validate a region code, normalised to upper case.
pub fn parse_region(s: &str) -> Result<String, String> {
    validate_region(s).map_err(|e| e.to_string())?;
    Ok(s.to_ascii_uppercase())
}
