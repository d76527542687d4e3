//! Mock detector used when `SpeciesNet` is not installed.
//!
//! Results are fabricated from the file name: keyword hits pick a species of
//! the matching category, everything else gets a detection for roughly 60%
//! of images. All choices are derived from a hash of the file name, so the
//! same file always yields the same result.

use crate::constants::mock::{DETECTION_PERCENT, MAX_CONFIDENCE, MIN_CONFIDENCE};
use crate::error::Result;
use crate::imaging::image_dimensions;
use crate::inference::catalog::{SPECIES_CATALOG, SpeciesInfo, category_from_keywords, species_in};
use crate::inference::{Detector, ImagePrediction};
use crate::output::{BoundingBox, Detection};
use std::path::{Path, PathBuf};
use tracing::trace;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic stand-in for the real model.
#[derive(Debug, Default)]
pub struct MockDetector;

impl MockDetector {
    /// Create a mock detector.
    pub fn new() -> Self {
        Self
    }

    fn detect_one(path: &Path) -> ImagePrediction {
        let (width, height) = match image_dimensions(path) {
            Ok(dims) => dims,
            Err(e) => return ImagePrediction::Failed(e.to_string()),
        };

        let file_name = path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().to_lowercase());
        let hash = fnv1a(file_name.as_bytes());
        let hinted = category_from_keywords(&file_name);

        if hinted.is_none() && hash % 100 >= DETECTION_PERCENT {
            trace!("mock: no detection for {file_name}");
            return ImagePrediction::Detected(Vec::new());
        }

        let candidates: Vec<&SpeciesInfo> = hinted
            .map(species_in)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| SPECIES_CATALOG.iter().collect());

        #[allow(clippy::cast_possible_truncation)]
        let pick = ((hash >> 8) % candidates.len() as u64) as usize;
        let species = candidates[pick];

        #[allow(clippy::cast_precision_loss)]
        let unit = ((hash >> 24) % 1000) as f32 / 999.0;
        let confidence = (MAX_CONFIDENCE - MIN_CONFIDENCE).mul_add(unit, MIN_CONFIDENCE);

        trace!(
            "mock: {file_name} -> {} ({confidence:.3})",
            species.scientific_name
        );

        ImagePrediction::Detected(vec![Detection {
            species: species.scientific_name.to_string(),
            scientific_name: species.scientific_name.to_string(),
            common_name: species.common_name.to_string(),
            category: species.category,
            confidence,
            bbox: Some(centered_bbox(width, height)),
        }])
    }
}

impl Detector for MockDetector {
    fn name(&self) -> &'static str {
        "SpeciesNet Mock Model"
    }

    fn is_mock(&self) -> bool {
        true
    }

    fn detect_batch(&self, images: &[PathBuf]) -> Result<Vec<ImagePrediction>> {
        Ok(images.iter().map(|p| Self::detect_one(p)).collect())
    }
}

/// Box covering the middle half of the frame, or the whole frame when it
/// is too small to halve.
fn centered_bbox(width: u32, height: u32) -> BoundingBox {
    if width < 4 || height < 4 {
        return [0, 0, width, height];
    }
    [width / 4, height / 4, width - width / 4, height - height / 4]
}

/// 64-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}
