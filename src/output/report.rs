//! Text report from a results CSV.

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::path::Path;

/// Number of species listed in the report's top list.
const TOP_SPECIES: usize = 5;

/// Aggregates read back from a results CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsAnalysis {
    /// Distinct image paths.
    pub total_images: usize,
    /// Rows with `detection_id > 0`.
    pub total_detections: usize,
    /// Detections per common name, most frequent first.
    pub species: Vec<(String, usize)>,
    /// Detections per category, most frequent first.
    pub categories: Vec<(String, usize)>,
}

impl ResultsAnalysis {
    /// Render as a plain-text report.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Wildlife Detection Analysis Report ===");
        let _ = writeln!(out);
        let _ = writeln!(out, "Total images: {}", self.total_images);
        let _ = writeln!(out, "Total detections: {}", self.total_detections);
        let _ = writeln!(out, "Species detected: {}", self.species.len());

        if self.total_detections > 0 {
            let _ = writeln!(out);
            let _ = writeln!(out, "Most frequent species:");
            for (name, count) in self.species.iter().take(TOP_SPECIES) {
                let _ = writeln!(out, "  {name}: {count}");
            }
        }

        if !self.categories.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Detections by category:");
            for (category, count) in &self.categories {
                let _ = writeln!(out, "  {category}: {count}");
            }
        }

        out
    }
}

fn sorted_counts(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut list: Vec<_> = counts.into_iter().collect();
    list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    list
}

/// Read a results CSV and aggregate it.
pub fn analyze_results_csv(path: &Path) -> Result<ResultsAnalysis> {
    let read_error = |e| Error::CsvRead {
        path: path.to_path_buf(),
        source: e,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(read_error)?;

    let headers = reader.headers().map_err(read_error)?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| Error::InvalidResultsFile {
                path: path.to_path_buf(),
                message: format!("missing column '{name}'"),
            })
    };
    let image_col = column("image_path")?;
    let id_col = column("detection_id")?;
    let name_col = column("common_name")?;
    let category_col = column("category")?;

    let mut images = HashSet::new();
    let mut total_detections = 0;
    let mut species: HashMap<String, usize> = HashMap::new();
    let mut categories: HashMap<String, usize> = HashMap::new();

    for record in reader.records() {
        let record = record.map_err(read_error)?;
        let field = |i: usize| record.get(i).unwrap_or_default();

        images.insert(field(image_col).to_string());
        if field(id_col).parse::<u32>().unwrap_or(0) > 0 {
            total_detections += 1;
        }
        if !field(name_col).is_empty() {
            *species.entry(field(name_col).to_string()).or_default() += 1;
        }
        if !field(category_col).is_empty() {
            *categories.entry(field(category_col).to_string()).or_default() += 1;
        }
    }

    Ok(ResultsAnalysis {
        total_images: images.len(),
        total_detections,
        species: sorted_counts(species),
        categories: sorted_counts(categories),
    })
}
