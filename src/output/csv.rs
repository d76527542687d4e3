//! Per-detection results CSV writer.

use crate::constants::UTF8_BOM;
use crate::constants::confidence::DECIMAL_PLACES;
use crate::error::{Error, Result};
use crate::output::{DetectionResult, OutputWriter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Columns of the results CSV.
pub const RESULTS_HEADER: [&str; 17] = [
    "image_path",
    "image_filename",
    "timestamp",
    "processing_time_seconds",
    "success",
    "error_message",
    "detection_id",
    "species",
    "scientific_name",
    "common_name",
    "confidence",
    "category",
    "bbox_x1",
    "bbox_y1",
    "bbox_x2",
    "bbox_y2",
    "total_detections_in_image",
];

/// Open a CSV writer, optionally prefixed with a UTF-8 BOM.
pub(crate) fn create_csv(path: &Path, bom: bool) -> Result<csv::Writer<BufWriter<File>>> {
    let mut file = BufWriter::new(File::create(path)?);
    if bom {
        file.write_all(UTF8_BOM)?;
    }
    Ok(csv::WriterBuilder::new().from_writer(file))
}

/// Map a csv error to the crate error for `path`.
pub(crate) fn csv_error(path: &Path) -> impl Fn(csv::Error) -> Error + '_ {
    move |e| Error::CsvWrite {
        path: path.to_path_buf(),
        source: e,
    }
}

/// Results CSV writer: one row per detection, one row for images without
/// detections.
pub struct CsvWriter {
    writer: csv::Writer<BufWriter<File>>,
    path: PathBuf,
}

impl CsvWriter {
    /// Create a new CSV writer.
    pub fn new(path: &Path, bom: bool) -> Result<Self> {
        Ok(Self {
            writer: create_csv(path, bom)?,
            path: path.to_path_buf(),
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(RESULTS_HEADER)
            .map_err(csv_error(&self.path))
    }

    fn write_result(&mut self, result: &DetectionResult) -> Result<()> {
        let base = [
            result.image_path.to_string_lossy().into_owned(),
            result.file_name(),
            result.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{:.3}", result.processing_time),
            result.success.to_string(),
            result.error_message.clone().unwrap_or_default(),
        ];

        if result.detections.is_empty() {
            let mut row = base.to_vec();
            row.extend(["0", "", "", "", "0", "", "0", "0", "0", "0", "0"].map(String::from));
            return self
                .writer
                .write_record(&row)
                .map_err(csv_error(&self.path));
        }

        let total = result.detections.len().to_string();
        for (i, detection) in result.detections.iter().enumerate() {
            let [x1, y1, x2, y2] = detection.bbox.unwrap_or_default();
            let mut row = base.to_vec();
            row.extend([
                (i + 1).to_string(),
                detection.species.clone(),
                detection.scientific_name.clone(),
                detection.common_name.clone(),
                format!("{:.decimal$}", detection.confidence, decimal = DECIMAL_PLACES),
                detection.category.to_string(),
                x1.to_string(),
                y1.to_string(),
                x2.to_string(),
                y2.to_string(),
                total.clone(),
            ]);
            self.writer
                .write_record(&row)
                .map_err(csv_error(&self.path))?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Write the results CSV for all results.
pub fn write_results_csv(results: &[DetectionResult], path: &Path, bom: bool) -> Result<()> {
    let mut writer = CsvWriter::new(path, bom)?;
    writer.write_header()?;
    for result in results {
        writer.write_result(result)?;
    }
    writer.finalize()
}
