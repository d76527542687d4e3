//! `SpeciesNet` backend.
//!
//! `SpeciesNet` is a Python package. Each batch is handed to its
//! `run_model` script through a file list and the predictions JSON it writes
//! is parsed back into detections.

use crate::config::InferenceDevice;
use crate::constants::speciesnet::{ANIMAL_LABEL, EMPTY_LABELS, PROBE_MODULE, RUN_MODULE};
use crate::error::{Error, Result};
use crate::imaging::image_dimensions;
use crate::inference::{Detector, ImagePrediction};
use crate::output::{BoundingBox, Category, Detection};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Number of stderr lines kept in process failure messages.
const STDERR_TAIL_LINES: usize = 5;

/// Top level of the predictions JSON.
#[derive(Debug, Deserialize)]
struct PredictionsFile {
    #[serde(default)]
    predictions: Vec<RawPrediction>,
}

/// One image entry in the predictions JSON.
#[derive(Debug, Deserialize)]
struct RawPrediction {
    filepath: String,
    #[serde(default)]
    prediction: Option<String>,
    #[serde(default)]
    prediction_score: Option<f32>,
    #[serde(default)]
    detections: Vec<RawDetection>,
    #[serde(default)]
    failures: Vec<String>,
}

/// One detector box in the predictions JSON.
#[derive(Debug, Deserialize)]
struct RawDetection {
    #[serde(default)]
    label: String,
    #[serde(default)]
    conf: f32,
    /// Normalised `[x, y, width, height]`.
    #[serde(default)]
    bbox: Vec<f32>,
}

/// Taxonomy parsed from a `SpeciesNet` label string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    /// Taxonomic class (e.g. `aves`).
    pub class: String,
    /// Scientific name, or the most specific rank available.
    pub scientific_name: String,
    /// Common name as reported by the model.
    pub common_name: String,
}

/// Parse a `uuid;class;order;family;genus;species;common name` label.
///
/// Returns `None` for labels that mean nothing was detected.
pub fn parse_label(label: &str) -> Option<Taxonomy> {
    let parts: Vec<&str> = label.split(';').map(str::trim).collect();
    if parts.len() < 7 {
        return None;
    }

    let common_name = parts[6].to_string();
    if common_name.is_empty() || EMPTY_LABELS.contains(&common_name.to_lowercase().as_str()) {
        return None;
    }

    let (genus, species) = (parts[4], parts[5]);
    let scientific_name = if !genus.is_empty() && !species.is_empty() {
        format!("{} {species}", capitalize(genus))
    } else {
        // Most specific non-empty rank
        parts[1..=5]
            .iter()
            .rev()
            .find(|p| !p.is_empty())
            .map_or_else(|| common_name.clone(), |p| (*p).to_string())
    };

    Some(Taxonomy {
        class: parts[1].to_string(),
        scientific_name,
        common_name,
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Convert a normalised `[x, y, w, h]` box into pixel `[x1, y1, x2, y2]`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn to_pixel_bbox(bbox: &[f32], width: u32, height: u32) -> Option<BoundingBox> {
    let [x, y, w, h] = <[f32; 4]>::try_from(bbox).ok()?;
    let (fw, fh) = (width as f32, height as f32);
    let px = |v: f32, max: f32| (v.clamp(0.0, 1.0) * max).round() as u32;
    Some([px(x, fw), px(y, fh), px(x + w, fw), px(y + h, fh)])
}

/// Turn a predictions JSON document into one entry per requested image.
///
/// Images missing from the document are reported as failures.
pub fn predictions_from_str(
    contents: &str,
    images: &[PathBuf],
    source: &Path,
) -> Result<Vec<ImagePrediction>> {
    let file: PredictionsFile =
        serde_json::from_str(contents).map_err(|e| Error::PredictionsParse {
            path: source.to_path_buf(),
            source: e,
        })?;

    let mut by_path: HashMap<String, RawPrediction> = file
        .predictions
        .into_iter()
        .map(|p| (p.filepath.clone(), p))
        .collect();

    Ok(images
        .iter()
        .map(|image| {
            let key = image.to_string_lossy();
            by_path.remove(key.as_ref()).map_or_else(
                || ImagePrediction::Failed("no prediction returned".to_string()),
                |raw| convert_prediction(image, raw),
            )
        })
        .collect())
}

fn convert_prediction(image: &Path, raw: RawPrediction) -> ImagePrediction {
    let Some(label) = raw.prediction.as_deref() else {
        let reason = if raw.failures.is_empty() {
            "no prediction returned".to_string()
        } else {
            raw.failures.join(", ")
        };
        return ImagePrediction::Failed(reason);
    };

    let Some(taxonomy) = parse_label(label) else {
        return ImagePrediction::Detected(Vec::new());
    };

    let best_box = raw
        .detections
        .iter()
        .filter(|d| d.label.is_empty() || d.label == ANIMAL_LABEL)
        .max_by(|a, b| a.conf.total_cmp(&b.conf))
        .or_else(|| raw.detections.iter().max_by(|a, b| a.conf.total_cmp(&b.conf)));

    let bbox = best_box.and_then(|d| match image_dimensions(image) {
        Ok((w, h)) => to_pixel_bbox(&d.bbox, w, h),
        Err(e) => {
            debug!("No dimensions for {}: {e}", image.display());
            None
        }
    });

    let category = Category::from_class(&taxonomy.class);
    ImagePrediction::Detected(vec![Detection {
        species: taxonomy.scientific_name.clone(),
        scientific_name: taxonomy.scientific_name,
        common_name: taxonomy.common_name,
        category,
        confidence: raw.prediction_score.unwrap_or(0.0),
        bbox,
    }])
}

/// Last few lines of a process's stderr.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join(" | ")
}

/// Detector that shells out to the `SpeciesNet` Python package.
#[derive(Debug, Clone)]
pub struct SpeciesNetDetector {
    python: String,
    region: Option<String>,
    model: Option<String>,
    device: InferenceDevice,
}

impl SpeciesNetDetector {
    /// Check whether `python` can import `SpeciesNet`.
    pub fn probe(python: &str) -> Result<()> {
        let output = Command::new(python)
            .args(["-c", &format!("import {PROBE_MODULE}")])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::DetectorUnavailable {
                python: python.to_string(),
                reason: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::DetectorUnavailable {
                python: python.to_string(),
                reason: stderr_tail(&output.stderr),
            })
        }
    }

    /// Create a detector after confirming the package is importable.
    pub fn new(
        python: &str,
        region: Option<String>,
        model: Option<String>,
        device: InferenceDevice,
    ) -> Result<Self> {
        Self::probe(python)?;
        info!("SpeciesNet available via {python}");
        Ok(Self {
            python: python.to_string(),
            region,
            model,
            device,
        })
    }

    fn command(&self, filepaths: &Path, predictions: &Path) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.args(["-m", RUN_MODULE])
            .arg("--filepaths_txt")
            .arg(filepaths)
            .arg("--predictions_json")
            .arg(predictions)
            .stdin(Stdio::null());
        if let Some(region) = &self.region {
            cmd.args(["--country", region]);
        }
        if let Some(model) = &self.model {
            cmd.args(["--model", model]);
        }
        if self.device == InferenceDevice::Cpu {
            cmd.env("CUDA_VISIBLE_DEVICES", "");
        }
        cmd
    }
}

impl Detector for SpeciesNetDetector {
    fn name(&self) -> &str {
        self.model.as_deref().unwrap_or("SpeciesNet")
    }

    fn detect_batch(&self, images: &[PathBuf]) -> Result<Vec<ImagePrediction>> {
        if images.is_empty() {
            return Ok(Vec::new());
        }

        let workdir = tempfile::Builder::new()
            .prefix("wildlife-detector-")
            .tempdir()?;
        let filepaths = workdir.path().join("filepaths.txt");
        let predictions = workdir.path().join("predictions.json");

        let list: String = images
            .iter()
            .map(|p| format!("{}\n", p.to_string_lossy()))
            .collect();
        std::fs::write(&filepaths, list)?;

        debug!("Running SpeciesNet on {} image(s)", images.len());
        let output = self
            .command(&filepaths, &predictions)
            .output()
            .map_err(|e| Error::DetectorProcess {
                reason: format!("failed to start {}: {e}", self.python),
            })?;

        if !output.status.success() {
            return Err(Error::DetectorProcess {
                reason: format!("{} ({})", output.status, stderr_tail(&output.stderr)),
            });
        }

        let contents =
            std::fs::read_to_string(&predictions).map_err(|e| Error::DetectorProcess {
                reason: format!("no predictions written: {e}"),
            })?;

        let results = predictions_from_str(&contents, images, &predictions)?;
        let failed = results
            .iter()
            .filter(|r| matches!(r, ImagePrediction::Failed(_)))
            .count();
        if failed > 0 {
            warn!("SpeciesNet failed on {failed} of {} image(s)", images.len());
        }
        Ok(results)
    }
}
