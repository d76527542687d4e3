//! Wildlife Detector - species detection for camera-trap images.
//!
//! This crate wraps the `SpeciesNet` model (or a deterministic mock when it
//! is not installed), exports results as CSV and sorts images into species
//! folders.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod imaging;
pub mod inference;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod sorting;
pub mod utils;

use chrono::Local;
use clap::{CommandFactory, Parser};
use cli::{AnalyzeArgs, Cli, Command, ConfigAction};
use config::{
    Config, InferenceDevice, backup_config, config_file_path, export_config, import_config,
    load_config_file, load_default_config, log_file_path, reset_config, restore_config,
    save_config, save_default_config, validate_config,
};
use imaging::validate_images;
use inference::WildlifeClassifier;
use inference::catalog::SPECIES_CATALOG;
use output::{
    Category, Detection, DetectionResult, OutputFiles, analyze_results_csv, export_all,
    file_stamp,
};
use pipeline::{
    BatchProcessor, ProcessingStats, collect_input_files, resolve_output_dir,
    restore_input_order, save_results_summary,
};
use sorting::{FileOrganizer, OrganizationSummary, TransferMode, clean_empty_folders};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

pub use error::{Error, Result};

/// Main entry point for the wildlife-detector CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let explicit_config = cli.config_file.is_some();
    let (config_path, loaded) = match cli.config_file.clone() {
        Some(path) => {
            let loaded = load_config_file(&path);
            (path, loaded)
        }
        None => (config_file_path()?, load_default_config()),
    };

    let logging_config = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    let log_file = if writes_log_file(cli.command.as_ref(), !cli.inputs.is_empty()) {
        log_file_path().ok()
    } else {
        None
    };
    if let Some(path) = logging::init_logging(
        cli.analyze.verbose,
        cli.analyze.quiet,
        &logging_config,
        log_file.as_deref(),
    )? {
        debug!("Logging to {}", path.display());
    }

    // First Ctrl+C stops after the running batches, the second exits
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130); // 128 + SIGINT(2)
        }
        warn!("Interrupt received, finishing running batches");
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    if let Some(command) = cli.command {
        return handle_command(command, &config_path, explicit_config, loaded, &cli.analyze);
    }

    if cli.inputs.is_empty() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let config = loaded?;
    analyze_files(&cli.inputs, &cli.analyze, &config, &cancel)
}

/// Only analysis and the self test write (and rotate) the log file.
fn writes_log_file(command: Option<&Command>, has_inputs: bool) -> bool {
    match command {
        None => has_inputs,
        Some(Command::Check) => true,
        Some(_) => false,
    }
}

/// Apply command line overrides on top of the loaded configuration.
fn apply_overrides(config: &mut Config, args: &AnalyzeArgs) {
    if let Some(min_confidence) = args.min_confidence {
        config.detection.min_confidence = min_confidence;
    }
    if let Some(batch_size) = args.batch_size {
        config.detection.batch_size = batch_size;
    }
    if let Some(workers) = args.workers {
        config.performance.workers = workers;
    }
    if let Some(region) = &args.region {
        config.detection.region.clone_from(region);
    }
    if let Some(backend) = args.backend {
        config.detector.backend = backend;
    }
    if let Some(sort) = args.sort {
        config.output.sort_mode = sort;
    }
    if let Some(species_list) = &args.species_list {
        config.detection.species_list_file = Some(species_list.clone());
    }
    if args.no_recursive {
        config.files.recursive = false;
    }
    if args.no_csv_bom {
        config.output.csv_bom = false;
    }
    if args.gpu {
        config.performance.device = InferenceDevice::Gpu;
    } else if args.cpu {
        config.performance.device = InferenceDevice::Cpu;
    }
}

/// Build the classifier described by `config`.
fn build_classifier(config: &Config) -> Result<WildlifeClassifier> {
    let species_list = match &config.detection.species_list_file {
        Some(path) => {
            info!("Loading species list: {}", path.display());
            Some(utils::species_list::read_species_list(path)?)
        }
        None => None,
    };

    WildlifeClassifier::from_config(
        &config.detector,
        &config.detection.region,
        config.performance.device,
        config.detection.min_confidence,
        species_list,
    )
}

/// Analyze input images with the given options.
fn analyze_files(
    inputs: &[PathBuf],
    args: &AnalyzeArgs,
    config: &Config,
    cancel: &AtomicBool,
) -> Result<()> {
    use crate::output::progress;

    let mut config = config.clone();
    apply_overrides(&mut config, args);
    validate_config(&config)?;

    let found = collect_input_files(
        inputs,
        config.files.recursive,
        &config.files.supported_formats,
    )?;
    if found.is_empty() {
        return Err(Error::NoValidImages);
    }
    info!("Found {} image file(s)", found.len());

    let (images, rejected) = validate_images(found.clone(), config.files.max_image_size_mb);
    if images.is_empty() {
        return Err(Error::NoValidImages);
    }
    let total_images = images.len() + rejected.len();

    let classifier = build_classifier(&config)?;
    let model = classifier.model_info();
    info!(
        "Model: {} (region {}, min confidence {:.2}, device {:?})",
        model.name, model.region, model.min_confidence, model.device
    );
    if model.mock {
        warn!("Results are simulated; install SpeciesNet for real detections");
    }

    let output_dir = resolve_output_dir(args.output_dir.as_deref(), &config.output)?;

    let progress_enabled = !args.quiet && !args.no_progress;
    let pb = progress::create_image_progress(images.len(), progress_enabled);
    let processor = BatchProcessor::new(config.detection.batch_size, config.performance.workers);
    let outcome = processor.process(&images, &classifier, pb.as_ref(), cancel)?;
    progress::finish_progress(
        pb,
        if outcome.cancelled {
            "Cancelled"
        } else {
            "Complete"
        },
    );

    let completed = outcome.results.len();
    let mut results = outcome.results;
    results.extend(
        rejected
            .into_iter()
            .map(|(path, e)| DetectionResult::failure(path, e.to_string(), 0.0)),
    );
    restore_input_order(&mut results, &found);

    let stamp = file_stamp(Local::now());
    let files = export_all(
        &results,
        &output_dir,
        &config.output.combined_prefix,
        &stamp,
        config.output.csv_bom,
    )?;

    let stats = ProcessingStats::from_results(total_images, &results, outcome.elapsed);
    if config.output.json_summary {
        save_results_summary(&stats, &files.summary_json)?;
    }

    let sorted = match TransferMode::from_sort_mode(config.output.sort_mode) {
        Some(mode) => {
            let organizer = FileOrganizer::new(&output_dir, &stamp);
            let summary = organizer.organize(&results, mode, classifier.min_confidence())?;
            clean_empty_folders(&summary.base_folder)?;
            Some(summary)
        }
        None => None,
    };

    info!(
        "Complete: {} image(s), {} detection(s), {} failed in {:.2}s",
        stats.processed_images,
        stats.total_detections,
        stats.failed_images,
        stats.processing_time
    );
    if !args.quiet {
        print_run_summary(&stats, &files, config.output.json_summary, sorted.as_ref());
    }

    if outcome.cancelled {
        return Err(Error::Cancelled {
            completed,
            total: images.len(),
        });
    }
    if args.fail_fast && stats.failed_images > 0 {
        return Err(Error::ImagesFailed {
            failed: stats.failed_images,
        });
    }
    if stats.failed_images > 0 {
        warn!("{} image(s) had errors", stats.failed_images);
    }

    Ok(())
}

fn print_run_summary(
    stats: &ProcessingStats,
    files: &OutputFiles,
    json_summary: bool,
    sorted: Option<&OrganizationSummary>,
) {
    println!();
    println!("Processed {} of {} image(s)", stats.processed_images, stats.total_images);
    println!("  Successful: {}", stats.successful_images);
    println!("  Failed: {}", stats.failed_images);
    println!("  Detections: {}", stats.total_detections);
    println!(
        "  Time: {:.2}s ({:.3}s per image)",
        stats.processing_time, stats.avg_time_per_image
    );

    if !stats.species_counts.is_empty() {
        println!();
        println!("Detected species:");
        let mut species: Vec<_> = stats.species_counts.iter().collect();
        species.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (name, count) in species {
            println!("  {name}: {count}");
        }
    }

    println!();
    println!("Results: {}", files.results.display());
    println!("Summary: {}", files.summary.display());
    println!("Species list: {}", files.species_list.display());
    if json_summary {
        println!("JSON summary: {}", files.summary_json.display());
    }
    if let Some(summary) = sorted {
        println!(
            "Sorted images: {} ({} organized, {} failed)",
            summary.base_folder.display(),
            summary.processed_images,
            summary.failed_images
        );
    }
}

fn handle_command(
    command: Command,
    config_path: &Path,
    explicit_config: bool,
    loaded: Result<Config>,
    args: &AnalyzeArgs,
) -> Result<()> {
    match command {
        Command::Config { action } => {
            handle_config_command(action, config_path, explicit_config, loaded)
        }
        Command::Species => {
            print_species();
            Ok(())
        }
        Command::Report { file } => {
            let analysis = analyze_results_csv(&file)?;
            println!("{}", analysis.render());
            Ok(())
        }
        Command::Check => run_checks(loaded, args),
    }
}

fn handle_config_command(
    action: ConfigAction,
    path: &Path,
    explicit_config: bool,
    loaded: Result<Config>,
) -> Result<()> {
    match action {
        ConfigAction::Init => {
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let created = if explicit_config {
                    save_config(&Config::default(), path)?;
                    path.to_path_buf()
                } else {
                    save_default_config(&Config::default())?
                };
                println!("Created configuration file: {}", created.display());
            }
        }
        ConfigAction::Show => {
            let config = loaded?;
            let contents = toml::to_string_pretty(&config)
                .map_err(|e| Error::ConfigSerialize { source: e })?;
            println!("# {}", path.display());
            println!("{contents}");
        }
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Reset => {
            if let Some(backup) = backup_config(path, None)? {
                println!("Previous configuration saved to: {}", backup.display());
            }
            reset_config(path)?;
            println!("Configuration reset to defaults: {}", path.display());
        }
        ConfigAction::Export { file } => {
            let config = loaded?;
            export_config(&config, path, &file)?;
            println!("Configuration exported to: {}", file.display());
        }
        ConfigAction::Import { file } => {
            import_config(&file, path)?;
            println!("Configuration imported from: {}", file.display());
        }
        ConfigAction::Backup => match backup_config(path, None)? {
            Some(backup) => println!("Configuration backed up to: {}", backup.display()),
            None => println!("No configuration file at {}", path.display()),
        },
        ConfigAction::Restore { file } => {
            restore_config(&file, path)?;
            println!("Configuration restored from: {}", file.display());
        }
    }
    Ok(())
}

fn print_species() {
    println!("Species in the built-in catalogue:");
    for category in Category::REPORTED {
        println!();
        println!("{category}:");
        for info in SPECIES_CATALOG.iter().filter(|s| s.category == category) {
            println!(
                "  {:<28} {:<24} {}",
                info.scientific_name, info.common_name, info.japanese_name
            );
        }
    }
}

/// Print one self-check line and return whether it passed.
fn report_check<T>(name: &str, outcome: Result<T>, detail: impl FnOnce(&T) -> String) -> bool {
    match outcome {
        Ok(value) => {
            println!("[ OK ] {name}: {}", detail(&value));
            true
        }
        Err(e) => {
            println!("[FAIL] {name}: {e}");
            false
        }
    }
}

/// Run the self test: configuration, detector, output directory and CSV
/// export.
fn run_checks(loaded: Result<Config>, args: &AnalyzeArgs) -> Result<()> {
    let mut failed = 0;

    let config = match loaded.and_then(|mut config| {
        apply_overrides(&mut config, args);
        validate_config(&config).map(|()| config)
    }) {
        Ok(config) => {
            println!("[ OK ] configuration: valid");
            config
        }
        Err(e) => {
            println!("[FAIL] configuration: {e}");
            failed += 1;
            Config::default()
        }
    };

    if !report_check("detector", build_classifier(&config), |c| {
        let model = c.model_info();
        format!("{} (region {})", model.name, model.region)
    }) {
        failed += 1;
    }

    let output_dir = resolve_output_dir(args.output_dir.as_deref(), &config.output).and_then(|dir| {
        tempfile::NamedTempFile::new_in(&dir)?;
        Ok(dir)
    });
    if !report_check("output directory", output_dir, |dir| {
        format!("{} is writable", dir.display())
    }) {
        failed += 1;
    }

    if !report_check("CSV export", check_export(&config), |files| {
        format!("wrote {} file(s)", files.len())
    }) {
        failed += 1;
    }

    if failed > 0 {
        return Err(Error::CheckFailed { failed });
    }
    println!("All checks passed");
    Ok(())
}

/// Export a synthetic result into a temporary directory and read it back.
fn check_export(config: &Config) -> Result<Vec<PathBuf>> {
    let dir = tempfile::tempdir()?;
    let detection = Detection {
        species: "Cervus nippon".to_string(),
        scientific_name: "Cervus nippon".to_string(),
        common_name: "Sika Deer".to_string(),
        category: Category::Mammal,
        confidence: 0.9,
        bbox: None,
    };
    let results = vec![
        DetectionResult::success(PathBuf::from("check_deer.jpg"), vec![detection], 0.01),
        DetectionResult::success(PathBuf::from("check_empty.jpg"), Vec::new(), 0.01),
    ];

    let files = export_all(
        &results,
        dir.path(),
        &config.output.combined_prefix,
        &file_stamp(Local::now()),
        config.output.csv_bom,
    )?;
    let analysis = analyze_results_csv(&files.results)?;
    if analysis.total_images != results.len() {
        return Err(Error::Internal {
            message: format!(
                "read back {} image(s), expected {}",
                analysis.total_images,
                results.len()
            ),
        });
    }

    let stats = ProcessingStats::from_results(results.len(), &results, Duration::ZERO);
    save_results_summary(&stats, &files.summary_json)?;

    Ok(vec![
        files.results,
        files.summary,
        files.species_list,
        files.summary_json,
    ])
}
