//! Inference module for wildlife species detection.

pub mod catalog;
mod classifier;
mod detector;
mod mock;
pub mod speciesnet;

pub use catalog::SpeciesInfo;
pub use classifier::{ModelInfo, WildlifeClassifier};
pub use detector::{Detector, ImagePrediction};
pub use mock::MockDetector;
pub use speciesnet::SpeciesNetDetector;
