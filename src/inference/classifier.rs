//! Classifier wrapper that selects a detector backend and post-processes
//! its raw predictions.

use crate::config::{DetectorBackend, DetectorConfig, InferenceDevice};
use crate::error::Result;
use crate::inference::catalog::{SPECIES_CATALOG, SpeciesInfo};
use crate::inference::{Detector, ImagePrediction, MockDetector, SpeciesNetDetector};
use crate::output::{Detection, DetectionResult};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Description of the active model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Backend name.
    pub name: String,
    /// Whether results are fabricated.
    pub mock: bool,
    /// Geofence region passed to the model.
    pub region: String,
    /// Confidence threshold applied to detections.
    pub min_confidence: f32,
    /// Requested inference device.
    pub device: InferenceDevice,
}

/// Species classifier with confidence and species-list filtering.
pub struct WildlifeClassifier {
    inner: Box<dyn Detector>,
    region: String,
    device: InferenceDevice,
    min_confidence: f32,
    /// Optional allow-list matched against scientific and common names.
    species_list: Option<HashSet<String>>,
}

impl WildlifeClassifier {
    /// Build a classifier from detector configuration.
    ///
    /// With [`DetectorBackend::Auto`] a missing `SpeciesNet` installation
    /// falls back to mock mode with a warning.
    pub fn from_config(
        detector_config: &DetectorConfig,
        region: &str,
        device: InferenceDevice,
        min_confidence: f32,
        species_list: Option<HashSet<String>>,
    ) -> Result<Self> {
        let country = Some(region.to_string()).filter(|r| !r.is_empty());
        let speciesnet = || {
            SpeciesNetDetector::new(
                &detector_config.python,
                country.clone(),
                detector_config.model.clone(),
                device,
            )
        };

        let inner: Box<dyn Detector> = match detector_config.backend {
            DetectorBackend::Mock => {
                info!("Using mock detector");
                Box::new(MockDetector::new())
            }
            DetectorBackend::Speciesnet => Box::new(speciesnet()?),
            DetectorBackend::Auto => match speciesnet() {
                Ok(detector) => Box::new(detector),
                Err(e) => {
                    debug!("SpeciesNet probe failed: {e}");
                    warn!("SpeciesNet is not available, running in mock mode");
                    Box::new(MockDetector::new())
                }
            },
        };

        Ok(Self::with_detector(
            inner,
            region,
            device,
            min_confidence,
            species_list,
        ))
    }

    /// Wrap an already constructed detector.
    pub fn with_detector(
        inner: Box<dyn Detector>,
        region: &str,
        device: InferenceDevice,
        min_confidence: f32,
        species_list: Option<HashSet<String>>,
    ) -> Self {
        if let Some(list) = &species_list {
            info!("Species list filter: {} species", list.len());
        }
        Self {
            inner,
            region: region.to_string(),
            device,
            min_confidence,
            species_list,
        }
    }

    /// Whether the active backend is the mock detector.
    pub fn is_mock(&self) -> bool {
        self.inner.is_mock()
    }

    /// Confidence threshold applied to detections.
    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// Description of the active model.
    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            name: self.inner.name().to_string(),
            mock: self.inner.is_mock(),
            region: self.region.clone(),
            min_confidence: self.min_confidence,
            device: self.device,
        }
    }

    /// Species known to the built-in catalogue.
    pub fn supported_species(&self) -> &'static [SpeciesInfo] {
        SPECIES_CATALOG
    }

    /// Run detection on a batch and build one result per image, in order.
    ///
    /// A batch-level error marks every image of the batch as failed.
    pub fn detect_batch(&self, images: &[PathBuf]) -> Vec<DetectionResult> {
        if images.is_empty() {
            return Vec::new();
        }

        let start = Instant::now();
        let outcome = self.inner.detect_batch(images);
        #[allow(clippy::cast_precision_loss)]
        let per_image = start.elapsed().as_secs_f64() / images.len() as f64;

        match outcome {
            Ok(predictions) if predictions.len() == images.len() => images
                .iter()
                .zip(predictions)
                .map(|(path, prediction)| match prediction {
                    ImagePrediction::Detected(detections) => DetectionResult::success(
                        path.clone(),
                        self.filter_detections(detections),
                        per_image,
                    ),
                    ImagePrediction::Failed(reason) => {
                        debug!("Detection failed for {}: {reason}", path.display());
                        DetectionResult::failure(path.clone(), reason, per_image)
                    }
                })
                .collect(),
            Ok(predictions) => {
                let reason = format!(
                    "detector returned {} result(s) for {} image(s)",
                    predictions.len(),
                    images.len()
                );
                warn!("{reason}");
                Self::fail_all(images, &reason, per_image)
            }
            Err(e) => {
                warn!("Batch of {} image(s) failed: {e}", images.len());
                Self::fail_all(images, &e.to_string(), per_image)
            }
        }
    }

    fn fail_all(images: &[PathBuf], reason: &str, per_image: f64) -> Vec<DetectionResult> {
        images
            .iter()
            .map(|p| DetectionResult::failure(p.clone(), reason, per_image))
            .collect()
    }

    /// Apply the confidence threshold and species list.
    fn filter_detections(&self, mut detections: Vec<Detection>) -> Vec<Detection> {
        let before_count = detections.len();

        detections.retain(|d| d.confidence >= self.min_confidence);
        if let Some(ref species_list) = self.species_list {
            detections.retain(|d| {
                species_list.contains(&d.scientific_name)
                    || species_list.contains(&d.common_name)
            });
        }

        let after_count = detections.len();
        if before_count != after_count {
            debug!(
                "Filter: {} detections before, {} after (filtered {})",
                before_count,
                after_count,
                before_count - after_count
            );
        }
        detections
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::output::Category;
    use crate::output::types::tests::detection;

    /// Detector returning a fixed answer for every image.
    struct FixedDetector(Result<Vec<Detection>>);

    impl Detector for FixedDetector {
        fn name(&self) -> &str {
            "fixed"
        }

        fn detect_batch(&self, images: &[PathBuf]) -> Result<Vec<ImagePrediction>> {
            match &self.0 {
                Ok(d) => Ok(images
                    .iter()
                    .map(|p| {
                        if p.to_string_lossy().contains("bad") {
                            ImagePrediction::Failed("unreadable".to_string())
                        } else {
                            ImagePrediction::Detected(d.clone())
                        }
                    })
                    .collect()),
                Err(_) => Err(Error::DetectorProcess {
                    reason: "exit status 1".to_string(),
                }),
            }
        }
    }

    fn classifier(result: Result<Vec<Detection>>, species: Option<&[&str]>) -> WildlifeClassifier {
        WildlifeClassifier::with_detector(
            Box::new(FixedDetector(result)),
            "JPN",
            InferenceDevice::Cpu,
            0.5,
            species.map(|s| s.iter().map(ToString::to_string).collect()),
        )
    }

    fn sample() -> Vec<Detection> {
        vec![
            detection("Cervus nippon", "Sika Deer", Category::Mammal, 0.9),
            detection("Sus scrofa", "Wild Boar", Category::Mammal, 0.3),
            detection("Vulpes vulpes", "Red Fox", Category::Mammal, 0.6),
        ]
    }

    #[test]
    fn test_confidence_threshold_applied() {
        let results = classifier(Ok(sample()), None).detect_batch(&[PathBuf::from("a.jpg")]);
        assert_eq!(results.len(), 1);
        assert!(results[0].success);
        assert_eq!(results[0].detections.len(), 2);
        assert!(results[0].detections.iter().all(|d| d.confidence >= 0.5));
    }

    #[test]
    fn test_species_list_matches_either_name() {
        let results = classifier(Ok(sample()), Some(&["Cervus nippon", "Red Fox"]))
            .detect_batch(&[PathBuf::from("a.jpg")]);
        let names: Vec<&str> = results[0]
            .detections
            .iter()
            .map(|d| d.common_name.as_str())
            .collect();
        assert_eq!(names, vec!["Sika Deer", "Red Fox"]);
    }

    #[test]
    fn test_per_image_failure_keeps_order() {
        let images = vec![
            PathBuf::from("a.jpg"),
            PathBuf::from("bad.jpg"),
            PathBuf::from("c.jpg"),
        ];
        let results = classifier(Ok(sample()), None).detect_batch(&images);
        assert_eq!(
            results.iter().map(|r| r.success).collect::<Vec<_>>(),
            vec![true, false, true]
        );
        assert_eq!(results[1].image_path, images[1]);
        assert_eq!(results[1].error_message.as_deref(), Some("unreadable"));
    }

    #[test]
    fn test_batch_error_fails_every_image() {
        let images = vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")];
        let results = classifier(
            Err(Error::Internal {
                message: String::new(),
            }),
            None,
        )
        .detect_batch(&images);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.success));
        assert!(
            results[0]
                .error_message
                .as_deref()
                .unwrap()
                .contains("exit status 1")
        );
    }

    #[test]
    fn test_mock_backend_from_config() {
        let config = DetectorConfig {
            backend: DetectorBackend::Mock,
            ..DetectorConfig::default()
        };
        let classifier =
            WildlifeClassifier::from_config(&config, "JPN", InferenceDevice::Auto, 0.5, None)
                .unwrap();
        assert!(classifier.is_mock());
        let info = classifier.model_info();
        assert!(info.mock);
        assert_eq!(info.region, "JPN");
        assert_eq!(classifier.supported_species().len(), 24);
    }

    #[test]
    fn test_auto_falls_back_to_mock() {
        let config = DetectorConfig {
            backend: DetectorBackend::Auto,
            python: "definitely-not-a-python-binary".to_string(),
            model: None,
        };
        let classifier =
            WildlifeClassifier::from_config(&config, "JPN", InferenceDevice::Auto, 0.5, None)
                .unwrap();
        assert!(classifier.is_mock());
    }

    #[test]
    fn test_forced_speciesnet_errors_when_missing() {
        let config = DetectorConfig {
            backend: DetectorBackend::Speciesnet,
            python: "definitely-not-a-python-binary".to_string(),
            model: None,
        };
        let result =
            WildlifeClassifier::from_config(&config, "JPN", InferenceDevice::Auto, 0.5, None);
        assert!(matches!(result, Err(Error::DetectorUnavailable { .. })));
    }
}
