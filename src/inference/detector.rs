//! Detector backend trait.

use crate::error::Result;
use crate::output::Detection;
use std::path::PathBuf;

/// Raw outcome for one image from a detector backend.
///
/// Confidence filtering happens later; backends report everything they see.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePrediction {
    /// Detection ran; zero or more species found.
    Detected(Vec<Detection>),
    /// Detection failed for this image only.
    Failed(String),
}

/// A species detection backend.
pub trait Detector: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Whether this backend fabricates results.
    fn is_mock(&self) -> bool {
        false
    }

    /// Run detection on a batch of images.
    ///
    /// Returns one entry per input, in input order. An `Err` means the whole
    /// batch failed.
    fn detect_batch(&self, images: &[PathBuf]) -> Result<Vec<ImagePrediction>>;
}
