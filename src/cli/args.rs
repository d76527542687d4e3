//! CLI argument definitions.

use crate::cli::validators::{parse_batch_size, parse_confidence, parse_region, parse_workers};
use crate::config::{DetectorBackend, SortMode};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Wildlife species detection for camera-trap images using `SpeciesNet`.
#[derive(Debug, Parser)]
#[command(name = "wildlife-detector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Input images or directories to analyze.
    pub inputs: Vec<PathBuf>,

    /// Configuration file (overrides the default location).
    #[arg(long = "config", global = true, env = "WILDLIFE_DETECTOR_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Common options for analysis.
    #[command(flatten)]
    pub analyze: AnalyzeArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List species known to the built-in catalogue.
    Species,
    /// Summarise a results CSV written by a previous run.
    Report {
        /// Path to a `*_results.csv` file.
        file: PathBuf,
    },
    /// Run a self test of configuration, detector and CSV export.
    Check,
}

/// Config subcommand actions.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
    /// Reset configuration to defaults.
    Reset,
    /// Export configuration with metadata to a file.
    Export {
        /// Target file.
        file: PathBuf,
    },
    /// Import and validate a configuration file, replacing the current one.
    Import {
        /// Source file.
        file: PathBuf,
    },
    /// Copy the configuration to a time-stamped backup.
    Backup,
    /// Validate a backup file and make it the current configuration.
    Restore {
        /// Backup file to restore.
        file: PathBuf,
    },
}

/// Arguments for the analyze command.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct AnalyzeArgs {
    /// Output directory (default: ~/WildlifeDetector/Output).
    #[arg(short, long, env = "WILDLIFE_DETECTOR_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Minimum confidence threshold (0.0-1.0).
    #[arg(short = 'c', long, value_parser = parse_confidence, env = "WILDLIFE_DETECTOR_MIN_CONFIDENCE")]
    pub min_confidence: Option<f32>,

    /// Images per detector call.
    #[arg(short, long, value_parser = parse_batch_size)]
    pub batch_size: Option<usize>,

    /// Number of worker threads.
    #[arg(short, long, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Geofence region (ISO 3166-1 alpha-3, e.g. JPN).
    #[arg(long, value_parser = parse_region)]
    pub region: Option<String>,

    /// Detector backend.
    #[arg(long, value_enum)]
    pub backend: Option<DetectorBackend>,

    /// Sort images into species folders.
    #[arg(long, value_enum)]
    pub sort: Option<SortMode>,

    /// Do not descend into subdirectories.
    #[arg(long)]
    pub no_recursive: bool,

    /// Path to species allow-list file.
    /// One scientific or common name per line.
    #[arg(long)]
    pub species_list: Option<PathBuf>,

    /// Write CSV files without a UTF-8 byte order mark.
    #[arg(long)]
    pub no_csv_bom: bool,

    /// Exit with an error if any image failed.
    #[arg(long)]
    pub fail_fast: bool,

    /// Suppress progress output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable the progress bar.
    #[arg(long)]
    pub no_progress: bool,

    /// Prefer GPU inference.
    #[arg(long, conflicts_with = "cpu")]
    pub gpu: bool,

    /// Force CPU inference.
    #[arg(long, conflicts_with = "gpu")]
    pub cpu: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_simple() {
        let cli = Cli::try_parse_from(["wildlife-detector", "photos/"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        assert_eq!(cli.inputs.len(), 1);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::try_parse_from([
            "wildlife-detector",
            "photos/",
            "-c",
            "0.25",
            "-b",
            "8",
            "-w",
            "2",
            "--region",
            "jpn",
            "--backend",
            "mock",
            "--sort",
            "copy",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.analyze.min_confidence, Some(0.25));
        assert_eq!(cli.analyze.batch_size, Some(8));
        assert_eq!(cli.analyze.workers, Some(2));
        assert_eq!(cli.analyze.region.as_deref(), Some("JPN"));
        assert_eq!(cli.analyze.backend, Some(DetectorBackend::Mock));
        assert_eq!(cli.analyze.sort, Some(SortMode::Copy));
        assert!(cli.analyze.quiet);
    }

    #[test]
    fn test_cli_rejects_invalid_values() {
        assert!(Cli::try_parse_from(["wildlife-detector", "x", "-c", "1.5"]).is_err());
        assert!(Cli::try_parse_from(["wildlife-detector", "x", "-w", "0"]).is_err());
        assert!(Cli::try_parse_from(["wildlife-detector", "x", "--sort", "shuffle"]).is_err());
        assert!(Cli::try_parse_from(["wildlife-detector", "x", "--gpu", "--cpu"]).is_err());
    }

    #[test]
    fn test_cli_parse_config_subcommand() {
        let cli = Cli::try_parse_from(["wildlife-detector", "config", "export", "out.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Export { .. }
            })
        ));
    }

    #[test]
    fn test_cli_parse_config_restore() {
        let cli =
            Cli::try_parse_from(["wildlife-detector", "config", "restore", "backup.toml"]).unwrap();
        match cli.command {
            Some(Command::Config {
                action: ConfigAction::Restore { file },
            }) => assert_eq!(file, PathBuf::from("backup.toml")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_report_and_check() {
        let cli = Cli::try_parse_from(["wildlife-detector", "report", "r.csv"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Report { .. })));
        let cli = Cli::try_parse_from(["wildlife-detector", "check"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Check)));
    }

    #[test]
    fn test_cli_parse_with_species_list() {
        let cli = Cli::try_parse_from([
            "wildlife-detector",
            "photos/",
            "--species-list",
            "species.txt",
        ])
        .unwrap();
        assert_eq!(cli.analyze.species_list, Some(PathBuf::from("species.txt")));
    }
}
