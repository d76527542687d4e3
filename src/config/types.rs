//! Configuration type definitions.

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_IMAGE_SIZE_MB, DEFAULT_MAX_LOG_FILES, DEFAULT_MEMORY_LIMIT_GB,
    DEFAULT_MIN_CONFIDENCE, DEFAULT_PYTHON, DEFAULT_REGION, DEFAULT_WORKERS, IMAGE_EXTENSIONS,
    output_files,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detection settings.
    pub detection: DetectionConfig,

    /// Performance settings.
    pub performance: PerformanceConfig,

    /// Detector backend settings.
    pub detector: DetectorConfig,

    /// Output settings.
    pub output: OutputConfig,

    /// Input file settings.
    pub files: FilesConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum confidence threshold.
    pub min_confidence: f32,

    /// Geofence region passed to `SpeciesNet` (ISO 3166-1 alpha-3).
    pub region: String,

    /// Number of images per detector call.
    pub batch_size: usize,

    /// Optional species allow-list file.
    pub species_list_file: Option<PathBuf>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            region: DEFAULT_REGION.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            species_list_file: None,
        }
    }
}

/// Inference device configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InferenceDevice {
    /// Let the model runtime decide.
    #[default]
    Auto,
    /// Prefer GPU.
    Gpu,
    /// Force CPU inference.
    Cpu,
}

/// Performance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Number of worker threads.
    pub workers: usize,

    /// Device hint for the model runtime.
    pub device: InferenceDevice,

    /// Memory limit hint in gigabytes.
    pub memory_limit_gb: f32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            device: InferenceDevice::Auto,
            memory_limit_gb: DEFAULT_MEMORY_LIMIT_GB,
        }
    }
}

/// Detector backend selection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DetectorBackend {
    /// `SpeciesNet` if installed, otherwise mock mode.
    #[default]
    Auto,
    /// Require `SpeciesNet`.
    Speciesnet,
    /// Always use mock mode.
    Mock,
}

impl std::fmt::Display for DetectorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Speciesnet => write!(f, "speciesnet"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// Detector backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Backend to use.
    pub backend: DetectorBackend,

    /// Python interpreter with `speciesnet` installed.
    pub python: String,

    /// Optional `SpeciesNet` model identifier (e.g. `kaggle:google/speciesnet/pyTorch/v4.0.1a`).
    pub model: Option<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            backend: DetectorBackend::Auto,
            python: DEFAULT_PYTHON.to_string(),
            model: None,
        }
    }
}

/// What to do with images after detection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Leave images where they are.
    #[default]
    Off,
    /// Copy images into species folders.
    Copy,
    /// Move images into species folders.
    Move,
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Copy => write!(f, "copy"),
            Self::Move => write!(f, "move"),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory (`None` = `~/WildlifeDetector/Output`).
    pub directory: Option<PathBuf>,

    /// Create the output directory tree if missing.
    pub create_subdirectories: bool,

    /// File sorting mode.
    pub sort_mode: SortMode,

    /// Write a UTF-8 BOM at the start of CSV files.
    pub csv_bom: bool,

    /// Prefix for exported files.
    pub combined_prefix: String,

    /// Also write a JSON run summary.
    pub json_summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            create_subdirectories: true,
            sort_mode: SortMode::Off,
            csv_bom: true,
            combined_prefix: output_files::DEFAULT_PREFIX.to_string(),
            json_summary: true,
        }
    }
}

/// Input file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Accepted file extensions (without dot).
    pub supported_formats: Vec<String>,

    /// Reject images larger than this many megabytes.
    pub max_image_size_mb: f32,

    /// Descend into subdirectories.
    pub recursive: bool,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            supported_formats: IMAGE_EXTENSIONS.iter().map(ToString::to_string).collect(),
            max_image_size_mb: DEFAULT_MAX_IMAGE_SIZE_MB,
            recursive: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base log level (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,

    /// Append log output to the per-user log file.
    pub log_to_file: bool,

    /// Number of log files kept (current + rotated).
    pub max_log_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: true,
            max_log_files: DEFAULT_MAX_LOG_FILES,
        }
    }
}
