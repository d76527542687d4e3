//! Batch processing of images on a worker pool.

use crate::error::{Error, Result};
use crate::inference::WildlifeClassifier;
use crate::output::DetectionResult;
use chrono::Local;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of a batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    /// One result per processed image, in input order.
    pub results: Vec<DetectionResult>,
    /// Whether the run stopped early.
    pub cancelled: bool,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Splits images into batches and runs them through a classifier.
#[derive(Debug, Clone, Copy)]
pub struct BatchProcessor {
    batch_size: usize,
    workers: usize,
}

impl BatchProcessor {
    /// Create a processor. Zero values are treated as one.
    pub fn new(batch_size: usize, workers: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            workers: workers.max(1),
        }
    }

    /// Process all images.
    ///
    /// Batches not yet started when `cancel` is set are skipped; results of
    /// completed batches are still returned.
    pub fn process(
        &self,
        images: &[PathBuf],
        classifier: &WildlifeClassifier,
        progress: Option<&ProgressBar>,
        cancel: &AtomicBool,
    ) -> Result<BatchOutcome> {
        let start = Instant::now();
        let batches: Vec<&[PathBuf]> = images.chunks(self.batch_size).collect();
        info!(
            "Processing {} image(s) in {} batch(es) with {} worker(s)",
            images.len(),
            batches.len(),
            self.workers
        );

        let run_batch = |batch: &[PathBuf]| -> Option<Vec<DetectionResult>> {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let results = classifier.detect_batch(batch);
            if let Some(pb) = progress {
                pb.inc(batch.len() as u64);
            }
            debug!("Finished batch of {} image(s)", batch.len());
            Some(results)
        };

        let per_batch: Vec<Option<Vec<DetectionResult>>> = if self.workers == 1 {
            batches.iter().map(|b| run_batch(b)).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .thread_name(|i| format!("detector-{i}"))
                .build()
                .map_err(|e| Error::WorkerPool {
                    reason: e.to_string(),
                })?;
            pool.install(|| batches.par_iter().map(|b| run_batch(b)).collect())
        };

        let cancelled = per_batch.iter().any(Option::is_none);
        let results: Vec<DetectionResult> = per_batch.into_iter().flatten().flatten().collect();

        if cancelled {
            warn!(
                "Processing cancelled: {} of {} image(s) completed",
                results.len(),
                images.len()
            );
        }

        Ok(BatchOutcome {
            results,
            cancelled,
            elapsed: start.elapsed(),
        })
    }
}

/// Aggregate statistics for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Images requested.
    pub total_images: usize,
    /// Images with a result (successful or failed).
    pub processed_images: usize,
    /// Images where detection ran.
    pub successful_images: usize,
    /// Images where detection failed.
    pub failed_images: usize,
    /// Detections across all images.
    pub total_detections: usize,
    /// Wall-clock run time in seconds.
    pub processing_time: f64,
    /// Average wall time per processed image in seconds.
    pub avg_time_per_image: f64,
    /// Detections per common name.
    pub species_counts: BTreeMap<String, usize>,
    /// Failed images per error message.
    pub error_counts: BTreeMap<String, usize>,
}

impl ProcessingStats {
    /// Compute statistics from results.
    pub fn from_results(total_images: usize, results: &[DetectionResult], elapsed: Duration) -> Self {
        let mut stats = Self {
            total_images,
            processed_images: results.len(),
            processing_time: elapsed.as_secs_f64(),
            ..Self::default()
        };

        for result in results {
            if result.success {
                stats.successful_images += 1;
            } else {
                stats.failed_images += 1;
                let message = result.error_message.clone().unwrap_or_default();
                *stats.error_counts.entry(message).or_default() += 1;
            }
            stats.total_detections += result.detections.len();
            for detection in &result.detections {
                *stats
                    .species_counts
                    .entry(detection.common_name.clone())
                    .or_default() += 1;
            }
        }

        if !results.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let avg = stats.processing_time / results.len() as f64;
            stats.avg_time_per_image = avg;
        }

        stats
    }
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    processing_stats: &'a ProcessingStats,
    timestamp: String,
}

/// Write the JSON run summary.
pub fn save_results_summary(stats: &ProcessingStats, path: &Path) -> Result<()> {
    let document = SummaryDocument {
        processing_stats: stats,
        timestamp: Local::now().to_rfc3339(),
    };
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &document).map_err(|e| {
        Error::JsonWrite {
            path: path.to_path_buf(),
            source: e,
        }
    })
}
