//! Per-species statistics CSV.

use crate::constants::confidence::DECIMAL_PLACES;
use crate::error::Result;
use crate::output::csv::{create_csv, csv_error};
use crate::output::{Category, DetectionResult};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Aggregated statistics for one species.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesStats {
    /// Common name.
    pub common_name: String,
    /// Scientific name.
    pub scientific_name: String,
    /// Taxonomic group.
    pub category: Category,
    /// Number of detections.
    pub detection_count: usize,
    /// Number of images containing the species (each image counted once).
    pub image_count: usize,
    /// Mean confidence.
    pub avg_confidence: f32,
    /// Lowest confidence.
    pub min_confidence: f32,
    /// Highest confidence.
    pub max_confidence: f32,
}

/// Compute per-species statistics, sorted by detection count (descending)
/// then common name.
pub fn species_stats(results: &[DetectionResult]) -> Vec<SpeciesStats> {
    let mut by_species: HashMap<&str, (SpeciesStats, f32)> = HashMap::new();

    for result in results.iter().filter(|r| r.success) {
        let mut seen = HashSet::new();
        for detection in &result.detections {
            let (stats, sum) = by_species
                .entry(detection.species.as_str())
                .or_insert_with(|| {
                    (
                        SpeciesStats {
                            common_name: detection.common_name.clone(),
                            scientific_name: detection.scientific_name.clone(),
                            category: detection.category,
                            detection_count: 0,
                            image_count: 0,
                            avg_confidence: 0.0,
                            min_confidence: f32::MAX,
                            max_confidence: f32::MIN,
                        },
                        0.0,
                    )
                });
            stats.detection_count += 1;
            *sum += detection.confidence;
            stats.min_confidence = stats.min_confidence.min(detection.confidence);
            stats.max_confidence = stats.max_confidence.max(detection.confidence);
            if seen.insert(detection.species.as_str()) {
                stats.image_count += 1;
            }
        }
    }

    let mut list: Vec<SpeciesStats> = by_species
        .into_values()
        .map(|(mut stats, sum)| {
            #[allow(clippy::cast_precision_loss)]
            let avg = sum / stats.detection_count as f32;
            stats.avg_confidence = avg;
            stats
        })
        .collect();

    list.sort_by(|a, b| {
        b.detection_count
            .cmp(&a.detection_count)
            .then_with(|| a.common_name.cmp(&b.common_name))
    });
    list
}

/// Write the species list CSV.
pub fn write_species_list_csv(results: &[DetectionResult], path: &Path, bom: bool) -> Result<()> {
    let mut writer = create_csv(path, bom)?;
    writer
        .write_record([
            "common_name",
            "scientific_name",
            "category",
            "detection_count",
            "image_count",
            "avg_confidence",
            "min_confidence",
            "max_confidence",
        ])
        .map_err(csv_error(path))?;

    let conf = |v: f32| format!("{v:.DECIMAL_PLACES$}");
    for s in species_stats(results) {
        writer
            .write_record([
                s.common_name.clone(),
                s.scientific_name.clone(),
                s.category.to_string(),
                s.detection_count.to_string(),
                s.image_count.to_string(),
                conf(s.avg_confidence),
                conf(s.min_confidence),
                conf(s.max_confidence),
            ])
            .map_err(csv_error(path))?;
    }
    writer.flush()?;
    Ok(())
}
