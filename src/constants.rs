//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "wildlife-detector";

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "WILDLIFE_DETECTOR_CONFIG";

/// Default minimum confidence threshold for detections.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

/// Default number of images sent to the detector in one call.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Maximum allowed batch size.
///
/// One batch is one `SpeciesNet` process; very large batches only delay
/// progress reporting and cancellation.
pub const MAX_BATCH_SIZE: usize = 1024;

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 4;

/// Default geofence region (ISO 3166-1 alpha-3).
pub const DEFAULT_REGION: &str = "JPN";

/// Default memory limit hint in gigabytes.
pub const DEFAULT_MEMORY_LIMIT_GB: f32 = 4.0;

/// Minimum accepted memory limit in gigabytes.
pub const MIN_MEMORY_LIMIT_GB: f32 = 0.5;

/// Default maximum image size in megabytes.
pub const DEFAULT_MAX_IMAGE_SIZE_MB: f32 = 50.0;

/// Minimum accepted maximum image size in megabytes.
pub const MIN_MAX_IMAGE_SIZE_MB: f32 = 1.0;

/// Default Python interpreter used to run `SpeciesNet`.
pub const DEFAULT_PYTHON: &str = "python3";

/// Default number of log files kept (current + rotated).
pub const DEFAULT_MAX_LOG_FILES: usize = 10;

/// Supported image file extensions (lowercase, without dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// Default output directory below the user's home.
pub const DEFAULT_OUTPUT_SUBDIR: &[&str] = &["WildlifeDetector", "Output"];

/// Timestamp format embedded in output file and folder names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Output file naming.
pub mod output_files {
    /// Default prefix for exported files.
    pub const DEFAULT_PREFIX: &str = "wildlife_detection";
    /// Suffix of the per-detection results CSV.
    pub const RESULTS_SUFFIX: &str = "_results.csv";
    /// Suffix of the summary statistics CSV.
    pub const SUMMARY_SUFFIX: &str = "_summary.csv";
    /// Suffix of the species list CSV.
    pub const SPECIES_LIST_SUFFIX: &str = "_species_list.csv";
    /// Suffix of the JSON run summary.
    pub const SUMMARY_JSON_SUFFIX: &str = "_summary.json";
}

/// File sorting conventions.
pub mod sorting {
    /// Prefix of the per-run organised images folder.
    pub const BASE_FOLDER_PREFIX: &str = "organized_images_";
    /// Folder for images without detections.
    pub const NO_DETECTION_FOLDER: &str = "no_detection";
    /// Folder for images with more than one species.
    pub const MULTIPLE_SPECIES_FOLDER: &str = "multiple_species";
    /// Folder name used when a species name sanitises to nothing.
    pub const UNKNOWN_SPECIES_FOLDER: &str = "unknown_species";
    /// Report written into the organised images folder.
    pub const REPORT_FILE: &str = "organization_report.txt";
    /// Characters replaced in folder names.
    pub const INVALID_FOLDER_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
    /// Maximum species characters embedded in a sorted file name.
    pub const SPECIES_NAME_CHARS: usize = 10;
    /// Highest numeric collision suffix before falling back to a time stamp.
    pub const MAX_COLLISION_SUFFIX: u32 = 999;
}

/// Confidence value bounds.
pub mod confidence {
    /// Minimum valid confidence value.
    pub const MIN: f32 = 0.0;
    /// Maximum valid confidence value.
    pub const MAX: f32 = 1.0;
    /// Decimal places for confidence formatting.
    pub const DECIMAL_PLACES: usize = 4;
}

/// `SpeciesNet` invocation details.
pub mod speciesnet {
    /// Python module that runs the full ensemble.
    pub const RUN_MODULE: &str = "speciesnet.scripts.run_model";
    /// Python module imported to probe availability.
    pub const PROBE_MODULE: &str = "speciesnet";
    /// Labels that mean "nothing detected".
    pub const EMPTY_LABELS: &[&str] = &["blank", "no cv result", "empty"];
    /// Detector label used for animals.
    pub const ANIMAL_LABEL: &str = "animal";
}

/// Mock detector tuning.
pub mod mock {
    /// Percentage of keyword-less images that still receive a detection.
    pub const DETECTION_PERCENT: u64 = 60;
    /// Lowest generated confidence.
    pub const MIN_CONFIDENCE: f32 = 0.5;
    /// Highest generated confidence.
    pub const MAX_CONFIDENCE: f32 = 0.95;
}

/// UTF-8 Byte Order Mark for Excel compatibility in CSV files.
pub const UTF8_BOM: &[u8; 3] = b"\xEF\xBB\xBF";

/// Log file name.
pub const LOG_FILE_NAME: &str = "wildlife-detector.log";
