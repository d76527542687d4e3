//! Output file naming.

use crate::constants::FILE_TIMESTAMP_FORMAT;
use crate::constants::output_files::{
    RESULTS_SUFFIX, SPECIES_LIST_SUFFIX, SUMMARY_JSON_SUFFIX, SUMMARY_SUFFIX,
};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Time stamp embedded in output names (`%Y%m%d_%H%M%S`).
pub fn file_stamp(time: DateTime<Local>) -> String {
    time.format(FILE_TIMESTAMP_FORMAT).to_string()
}

/// Paths of the files exported for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    /// Per-detection results CSV.
    pub results: PathBuf,
    /// Summary statistics CSV.
    pub summary: PathBuf,
    /// Species list CSV.
    pub species_list: PathBuf,
    /// JSON run summary.
    pub summary_json: PathBuf,
}

impl OutputFiles {
    /// Build paths `{dir}/{prefix}_{stamp}{suffix}`.
    pub fn new(dir: &Path, prefix: &str, stamp: &str) -> Self {
        let path = |suffix: &str| dir.join(format!("{prefix}_{stamp}{suffix}"));
        Self {
            results: path(RESULTS_SUFFIX),
            summary: path(SUMMARY_SUFFIX),
            species_list: path(SPECIES_LIST_SUFFIX),
            summary_json: path(SUMMARY_JSON_SUFFIX),
        }
    }
}
