//! Summary statistics CSV.

use crate::error::Result;
use crate::output::csv::{create_csv, csv_error};
use crate::output::{Category, DetectionResult};
use std::collections::HashMap;
use std::path::Path;

/// One `metric,value,description` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    /// Metric key.
    pub metric: String,
    /// Formatted value.
    pub value: String,
    /// Human-readable description.
    pub description: String,
}

fn row(metric: &str, value: impl ToString, description: &str) -> SummaryRow {
    SummaryRow {
        metric: metric.to_string(),
        value: value.to_string(),
        description: description.to_string(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Round to `places` decimals.
fn round(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Compute the summary rows for a run.
///
/// An empty run yields only `total_images,0`.
pub fn summary_rows(results: &[DetectionResult]) -> Vec<SummaryRow> {
    if results.is_empty() {
        return vec![row("total_images", 0, "Number of images processed")];
    }

    let total_images = results.len();
    let successful = results.iter().filter(|r| r.success).count();
    let failed = total_images - successful;
    let with_detections = results
        .iter()
        .filter(|r| r.success && !r.detections.is_empty())
        .count();

    let detections: Vec<_> = results
        .iter()
        .filter(|r| r.success)
        .flat_map(|r| &r.detections)
        .collect();
    let total_detections = detections.len();

    let mut species_counts: HashMap<&str, usize> = HashMap::new();
    let mut category_counts: HashMap<Category, usize> = HashMap::new();
    for detection in &detections {
        *species_counts
            .entry(detection.common_name.as_str())
            .or_default() += 1;
        *category_counts.entry(detection.category).or_default() += 1;
    }
    // Ties resolve to the alphabetically first name for stable output
    let most_common = species_counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map_or("N/A", |(name, _)| *name);

    let times: Vec<f64> = results
        .iter()
        .map(|r| r.processing_time)
        .filter(|t| *t > 0.0)
        .collect();
    let total_time: f64 = times.iter().sum();
    #[allow(clippy::cast_precision_loss)]
    let avg_time = if times.is_empty() {
        0.0
    } else {
        total_time / times.len() as f64
    };
    #[allow(clippy::cast_precision_loss)]
    let images_per_second = if total_time > 0.0 {
        total_images as f64 / total_time
    } else {
        0.0
    };

    let confidences: Vec<f64> = detections
        .iter()
        .map(|d| f64::from(d.confidence))
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let avg_conf = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };
    let min_conf = confidences.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max_conf = confidences.iter().copied().reduce(f64::max).unwrap_or(0.0);

    let mut rows = vec![
        row("total_images", total_images, "Number of images processed"),
        row("successful_images", successful, "Images processed successfully"),
        row("failed_images", failed, "Images that failed processing"),
        row(
            "success_rate_percent",
            round(ratio(successful, total_images) * 100.0, 2),
            "Processing success rate (%)",
        ),
        row(
            "images_with_detections",
            with_detections,
            "Images with at least one detection",
        ),
        row(
            "detection_rate_percent",
            round(ratio(with_detections, total_images) * 100.0, 2),
            "Detection rate (%)",
        ),
        row("total_detections", total_detections, "Total number of detections"),
        row(
            "avg_detections_per_image",
            round(ratio(total_detections, total_images), 2),
            "Average detections per image",
        ),
        row(
            "unique_species_count",
            species_counts.len(),
            "Number of distinct species detected",
        ),
        row("most_common_species", most_common, "Most frequently detected species"),
    ];

    for category in Category::REPORTED {
        rows.push(row(
            &format!("{category}_detections"),
            category_counts.get(&category).copied().unwrap_or(0),
            &format!("Detections in category {category}"),
        ));
    }

    rows.extend([
        row(
            "total_processing_time_seconds",
            round(total_time, 2),
            "Total processing time (s)",
        ),
        row(
            "avg_processing_time_seconds",
            round(avg_time, 3),
            "Average processing time per image (s)",
        ),
        row(
            "images_per_second",
            round(images_per_second, 2),
            "Processing speed (images/s)",
        ),
        row("avg_confidence", round(avg_conf, 4), "Average confidence"),
        row("min_confidence", round(min_conf, 4), "Lowest confidence"),
        row("max_confidence", round(max_conf, 4), "Highest confidence"),
    ]);

    rows
}

/// Write the summary CSV.
pub fn write_summary_csv(results: &[DetectionResult], path: &Path, bom: bool) -> Result<()> {
    let mut writer = create_csv(path, bom)?;
    writer
        .write_record(["metric", "value", "description"])
        .map_err(csv_error(path))?;
    for r in summary_rows(results) {
        writer
            .write_record([&r.metric, &r.value, &r.description])
            .map_err(csv_error(path))?;
    }
    writer.flush()?;
    Ok(())
}
