//! Configuration loading and management.

mod file;
mod paths;
mod types;
mod validate;

pub use file::{
    ExportInfo, backup_config, export_config, import_config, load_config_file,
    load_default_config, reset_config, restore_config, save_config, save_default_config,
};
pub use paths::{config_dir, config_file_path, default_output_dir, log_dir, log_file_path};
pub use types::{
    Config, DetectionConfig, DetectorBackend, DetectorConfig, FilesConfig, InferenceDevice,
    LoggingConfig, OutputConfig, PerformanceConfig, SortMode,
};
pub use validate::{validate_batch_size, validate_config, validate_region};
