//! Output type definitions.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Broad taxonomic group of a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Aves.
    Bird,
    /// Mammalia.
    Mammal,
    /// Reptilia.
    Reptile,
    /// Amphibia.
    Amphibian,
    /// Anything else (including non-animal labels such as humans or vehicles).
    Other,
}

impl Category {
    /// Map a taxonomic class name to a category.
    pub fn from_class(class: &str) -> Self {
        match class.to_ascii_lowercase().as_str() {
            "aves" | "bird" => Self::Bird,
            "mammalia" | "mammal" => Self::Mammal,
            "reptilia" | "reptile" => Self::Reptile,
            "amphibia" | "amphibian" => Self::Amphibian,
            _ => Self::Other,
        }
    }

    /// Categories reported individually in the summary.
    pub const REPORTED: [Self; 4] = [Self::Bird, Self::Mammal, Self::Reptile, Self::Amphibian];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bird => write!(f, "bird"),
            Self::Mammal => write!(f, "mammal"),
            Self::Reptile => write!(f, "reptile"),
            Self::Amphibian => write!(f, "amphibian"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Pixel bounding box `[x1, y1, x2, y2]`.
pub type BoundingBox = [u32; 4];

/// A single species detection in an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Stable species key (scientific name).
    pub species: String,
    /// Scientific name of the species.
    pub scientific_name: String,
    /// Common name of the species.
    pub common_name: String,
    /// Taxonomic group.
    pub category: Category,
    /// Detection confidence (0.0 - 1.0).
    pub confidence: f32,
    /// Bounding box, if the detector produced one.
    pub bbox: Option<BoundingBox>,
}

/// Detection outcome for one input image.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Path to the source image.
    pub image_path: PathBuf,
    /// Detections at or above the confidence threshold.
    pub detections: Vec<Detection>,
    /// Time spent on this image in seconds.
    pub processing_time: f64,
    /// Whether detection ran without error.
    pub success: bool,
    /// Error description for failed images.
    pub error_message: Option<String>,
    /// When the image was processed.
    pub timestamp: DateTime<Local>,
}

impl DetectionResult {
    /// Build a successful result.
    pub fn success(image_path: PathBuf, detections: Vec<Detection>, processing_time: f64) -> Self {
        Self {
            image_path,
            detections,
            processing_time,
            success: true,
            error_message: None,
            timestamp: Local::now(),
        }
    }

    /// Build a failed result.
    pub fn failure(image_path: PathBuf, error: impl Into<String>, processing_time: f64) -> Self {
        Self {
            image_path,
            detections: Vec::new(),
            processing_time,
            success: false,
            error_message: Some(error.into()),
            timestamp: Local::now(),
        }
    }

    /// Highest-confidence detection.
    pub fn best_detection(&self) -> Option<&Detection> {
        self.detections
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }

    /// Number of distinct species detected.
    pub fn species_count(&self) -> usize {
        self.detections
            .iter()
            .map(|d| d.species.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Detections with confidence at or above `threshold`.
    pub fn filter_by_confidence(&self, threshold: f32) -> Vec<&Detection> {
        self.detections
            .iter()
            .filter(|d| d.confidence >= threshold)
            .collect()
    }

    /// File name of the image, lossily converted.
    pub fn file_name(&self) -> String {
        self.image_path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn detection(species: &str, common: &str, category: Category, conf: f32) -> Detection {
        Detection {
            species: species.to_string(),
            scientific_name: species.to_string(),
            common_name: common.to_string(),
            category,
            confidence: conf,
            bbox: Some([10, 20, 100, 150]),
        }
    }

    #[test]
    fn test_category_from_class() {
        assert_eq!(Category::from_class("aves"), Category::Bird);
        assert_eq!(Category::from_class("Mammalia"), Category::Mammal);
        assert_eq!(Category::from_class("reptilia"), Category::Reptile);
        assert_eq!(Category::from_class("amphibia"), Category::Amphibian);
        assert_eq!(Category::from_class(""), Category::Other);
    }

    #[test]
    fn test_best_detection() {
        let result = DetectionResult::success(
            PathBuf::from("a.jpg"),
            vec![
                detection("Sus scrofa", "Wild Boar", Category::Mammal, 0.6),
                detection("Cervus nippon", "Sika Deer", Category::Mammal, 0.9),
            ],
            0.1,
        );
        assert_eq!(result.best_detection().unwrap().common_name, "Sika Deer");
    }

    #[test]
    fn test_species_count_distinct() {
        let result = DetectionResult::success(
            PathBuf::from("a.jpg"),
            vec![
                detection("Cervus nippon", "Sika Deer", Category::Mammal, 0.7),
                detection("Cervus nippon", "Sika Deer", Category::Mammal, 0.8),
            ],
            0.1,
        );
        assert_eq!(result.species_count(), 1);
    }

    #[test]
    fn test_filter_by_confidence() {
        let result = DetectionResult::success(
            PathBuf::from("a.jpg"),
            vec![
                detection("Sus scrofa", "Wild Boar", Category::Mammal, 0.4),
                detection("Cervus nippon", "Sika Deer", Category::Mammal, 0.9),
            ],
            0.1,
        );
        let kept = result.filter_by_confidence(0.5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].confidence, 0.9);
    }

    #[test]
    fn test_failure_has_no_detections() {
        let result = DetectionResult::failure(PathBuf::from("x/b.png"), "boom", 0.0);
        assert!(!result.success);
        assert!(result.detections.is_empty());
        assert_eq!(result.error_message.as_deref(), Some("boom"));
        assert_eq!(result.file_name(), "b.png");
    }
}
