//! Error types for wildlife-detector.

/// Result type alias for wildlife-detector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for wildlife-detector.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Data directory (for log files) could not be determined.
    #[error("could not determine data directory for this platform")]
    DataDirNotFound,

    /// Home directory could not be determined.
    #[error("could not determine home directory for this platform")]
    HomeDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Configuration file to import or restore does not exist.
    #[error("config file does not exist: {path}")]
    ConfigNotFound {
        /// Path to the missing file.
        path: std::path::PathBuf,
    },

    /// No valid image files found.
    #[error("no valid image files found in the provided paths")]
    NoValidImages,

    /// Image file failed validation.
    #[error("invalid image '{path}': {reason}")]
    InvalidImage {
        /// Path to the image file.
        path: std::path::PathBuf,
        /// Why the image was rejected.
        reason: String,
    },

    /// Failed to decode image header.
    #[error("failed to decode image '{path}'")]
    ImageDecode {
        /// Path to the image file.
        path: std::path::PathBuf,
        /// Underlying decode error.
        #[source]
        source: image::ImageError,
    },

    /// The `SpeciesNet` backend was requested but cannot be used.
    #[error("SpeciesNet is not available via '{python}': {reason}")]
    DetectorUnavailable {
        /// Python interpreter that was probed.
        python: String,
        /// Description of the failure.
        reason: String,
    },

    /// The external detector process failed.
    #[error("detector process failed: {reason}")]
    DetectorProcess {
        /// Description of the failure.
        reason: String,
    },

    /// Failed to parse detector predictions.
    #[error("failed to parse predictions file '{path}'")]
    PredictionsParse {
        /// Path to the predictions JSON.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to build the worker pool.
    #[error("failed to build worker pool: {reason}")]
    WorkerPool {
        /// Description of the failure.
        reason: String,
    },

    /// Failed to write a CSV file.
    #[error("failed to write CSV file '{path}'")]
    CsvWrite {
        /// Path to the CSV file.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Failed to read a results CSV file.
    #[error("failed to read results file '{path}'")]
    CsvRead {
        /// Path to the CSV file.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Results CSV does not have the expected layout.
    #[error("invalid results file '{path}': {message}")]
    InvalidResultsFile {
        /// Path to the CSV file.
        path: std::path::PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// Failed to write JSON output file.
    #[error("failed to write JSON output file '{path}'")]
    JsonWrite {
        /// Path to the JSON file.
        path: std::path::PathBuf,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read species list file.
    #[error("failed to read species list file '{path}'")]
    SpeciesListRead {
        /// Path to the species list file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to open the log file.
    #[error("failed to open log file '{path}'")]
    LogFile {
        /// Path to the log file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Some images failed and `--fail-fast` was requested.
    #[error("{failed} image(s) failed detection")]
    ImagesFailed {
        /// Number of failed images.
        failed: usize,
    },

    /// Processing was interrupted.
    #[error("processing cancelled after {completed} of {total} image(s)")]
    Cancelled {
        /// Images completed before cancellation.
        completed: usize,
        /// Images requested.
        total: usize,
    },

    /// Self-test failed.
    #[error("{failed} self-check(s) failed")]
    CheckFailed {
        /// Number of failed checks.
        failed: usize,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}
