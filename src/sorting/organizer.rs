//! Sorting images into per-species folders.

use crate::config::SortMode;
use crate::constants::sorting::{
    BASE_FOLDER_PREFIX, INVALID_FOLDER_CHARS, MAX_COLLISION_SUFFIX, MULTIPLE_SPECIES_FOLDER,
    NO_DETECTION_FOLDER, REPORT_FILE, SPECIES_NAME_CHARS, UNKNOWN_SPECIES_FOLDER,
};
use crate::error::{Error, Result};
use crate::output::{Category, Detection, DetectionResult};
use chrono::Local;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How files are placed into the sorted tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Copy, leaving the source in place.
    Copy,
    /// Move the source.
    Move,
}

impl TransferMode {
    /// Transfer mode for a configured sort mode, `None` when sorting is off.
    pub fn from_sort_mode(mode: SortMode) -> Option<Self> {
        match mode {
            SortMode::Off => None,
            SortMode::Copy => Some(Self::Copy),
            SortMode::Move => Some(Self::Move),
        }
    }
}

/// Statistics for one species folder.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesFolder {
    /// Common name of the species.
    pub species_name: String,
    /// Scientific name of the species.
    pub scientific_name: String,
    /// Taxonomic group.
    pub category: Category,
    /// Files placed in the folder.
    pub file_count: usize,
    /// Running average of the per-image confidence.
    pub avg_confidence: f32,
}

/// Outcome of a sorting run.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationSummary {
    /// Root of the sorted tree.
    pub base_folder: PathBuf,
    /// Results handed to the organiser.
    pub total_images: usize,
    /// Files copied or moved.
    pub processed_images: usize,
    /// Files that could not be placed.
    pub failed_images: usize,
    /// Files placed in `no_detection`.
    pub no_detection_count: usize,
    /// Files placed in `multiple_species`.
    pub multiple_species_count: usize,
    /// Species folders keyed by folder name.
    pub species_folders: BTreeMap<String, SpeciesFolder>,
    /// Files that were not placed, with the reason.
    pub errors: Vec<(PathBuf, String)>,
}

/// Where one image goes.
enum Placement<'a> {
    NoDetection,
    Species(&'a Detection),
    Multiple(usize),
}

/// Replace characters that are invalid in folder names.
///
/// Runs of `_` collapse, surrounding spaces and dots are trimmed, and an
/// empty result becomes `unknown_species`.
pub fn sanitize_folder_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if INVALID_FOLDER_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let mut collapsed = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if !(c == '_' && collapsed.ends_with('_')) {
            collapsed.push(c);
        }
    }

    let trimmed = collapsed.trim_matches(|c| c == ' ' || c == '.');
    if trimmed.is_empty() {
        UNKNOWN_SPECIES_FOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

fn split_name(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map_or_else(|| "image".to_string(), |s| s.to_string_lossy().into_owned());
    let ext = path
        .extension()
        .map_or_else(String::new, |e| format!(".{}", e.to_string_lossy()));
    (stem, ext)
}

fn target_file_name(source: &Path, placement: &Placement<'_>) -> String {
    let (stem, ext) = split_name(source);
    match placement {
        Placement::NoDetection => format!("{stem}_no_detection{ext}"),
        Placement::Species(detection) => {
            let short: String = detection.species.chars().take(SPECIES_NAME_CHARS).collect();
            let short = if short.is_empty() {
                "unknown".to_string()
            } else {
                short.replace(INVALID_FOLDER_CHARS, "_")
            };
            format!("{stem}_{short}_{:.3}{ext}", detection.confidence)
        }
        Placement::Multiple(n) => format!("{stem}_multi_{n}species{ext}"),
    }
}

/// Pick a path that does not exist yet.
///
/// Tries `{name}_001{ext}` through `_999`, then a `_HHMMSS` time stamp.
pub fn avoid_collision(target: &Path) -> PathBuf {
    if !target.exists() {
        return target.to_path_buf();
    }

    let (stem, ext) = split_name(target);
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    for counter in 1..=MAX_COLLISION_SUFFIX {
        let candidate = parent.join(format!("{stem}_{counter:03}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }
    parent.join(format!("{stem}_{}{ext}", Local::now().format("%H%M%S")))
}

fn transfer(source: &Path, target: &Path, mode: TransferMode) -> std::io::Result<()> {
    match mode {
        TransferMode::Copy => std::fs::copy(source, target).map(|_| ()),
        TransferMode::Move => std::fs::rename(source, target).or_else(|e| {
            // Rename fails across file systems
            debug!("rename failed ({e}), falling back to copy and remove");
            std::fs::copy(source, target)?;
            std::fs::remove_file(source)
        }),
    }
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::OutputDirCreateFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Sorts images into `organized_images_{stamp}` below an output directory.
#[derive(Debug, Clone)]
pub struct FileOrganizer {
    output_dir: PathBuf,
    stamp: String,
}

impl FileOrganizer {
    /// Create an organiser writing below `output_dir`.
    pub fn new(output_dir: &Path, stamp: &str) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            stamp: stamp.to_string(),
        }
    }

    /// Root folder of the sorted tree.
    pub fn base_folder(&self) -> PathBuf {
        self.output_dir
            .join(format!("{BASE_FOLDER_PREFIX}{}", self.stamp))
    }

    /// Sort images by detected species.
    ///
    /// Failed detections and missing files are not placed; they are listed
    /// as errors. Only detections at or above `min_confidence` count.
    pub fn organize(
        &self,
        results: &[DetectionResult],
        mode: TransferMode,
        min_confidence: f32,
    ) -> Result<OrganizationSummary> {
        let base = self.base_folder();
        info!(
            "Sorting {} image(s) into {} ({mode:?})",
            results.len(),
            base.display()
        );
        create_dir(&base.join(NO_DETECTION_FOLDER))?;
        create_dir(&base.join(MULTIPLE_SPECIES_FOLDER))?;

        let mut summary = OrganizationSummary {
            base_folder: base.clone(),
            total_images: results.len(),
            processed_images: 0,
            failed_images: 0,
            no_detection_count: 0,
            multiple_species_count: 0,
            species_folders: BTreeMap::new(),
            errors: Vec::new(),
        };

        for result in results {
            let source = &result.image_path;
            if !result.success {
                let reason = result
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "detection failed".to_string());
                summary.failed_images += 1;
                summary.errors.push((source.clone(), reason));
                continue;
            }
            if !source.is_file() {
                warn!("Source file not found: {}", source.display());
                summary.failed_images += 1;
                summary
                    .errors
                    .push((source.clone(), "file not found".to_string()));
                continue;
            }

            let kept = result.filter_by_confidence(min_confidence);
            let distinct: HashSet<&str> = kept.iter().map(|d| d.species.as_str()).collect();
            let placement = match distinct.len() {
                0 => Placement::NoDetection,
                1 => Placement::Species(
                    kept.iter()
                        .copied()
                        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
                        .ok_or_else(|| Error::Internal {
                            message: "species placement without detection".to_string(),
                        })?,
                ),
                n => Placement::Multiple(n),
            };

            let folder_name = match &placement {
                Placement::NoDetection => NO_DETECTION_FOLDER.to_string(),
                Placement::Species(d) => sanitize_folder_name(&d.common_name),
                Placement::Multiple(_) => MULTIPLE_SPECIES_FOLDER.to_string(),
            };
            let folder = base.join(&folder_name);
            if let Err(e) = create_dir(&folder) {
                summary.failed_images += 1;
                summary.errors.push((source.clone(), e.to_string()));
                continue;
            }

            let target = avoid_collision(&folder.join(target_file_name(source, &placement)));
            if let Err(e) = transfer(source, &target, mode) {
                warn!("Failed to place {}: {e}", source.display());
                summary.failed_images += 1;
                summary.errors.push((source.clone(), e.to_string()));
                continue;
            }
            debug!("{} -> {}", source.display(), target.display());
            summary.processed_images += 1;

            match placement {
                Placement::NoDetection => summary.no_detection_count += 1,
                Placement::Multiple(_) => summary.multiple_species_count += 1,
                Placement::Species(detection) => {
                    let entry = summary
                        .species_folders
                        .entry(folder_name)
                        .or_insert_with(|| SpeciesFolder {
                            species_name: detection.common_name.clone(),
                            scientific_name: detection.scientific_name.clone(),
                            category: detection.category,
                            file_count: 0,
                            avg_confidence: 0.0,
                        });
                    #[allow(clippy::cast_precision_loss)]
                    let mean = kept.iter().map(|d| d.confidence).sum::<f32>() / kept.len() as f32;
                    entry.file_count += 1;
                    #[allow(clippy::cast_precision_loss)]
                    let count = entry.file_count as f32;
                    entry.avg_confidence = entry.avg_confidence.mul_add(count - 1.0, mean) / count;
                }
            }
        }

        write_report(&base.join(REPORT_FILE), &summary)?;
        info!(
            "Sorted {}/{} image(s) into {} species folder(s)",
            summary.processed_images,
            summary.total_images,
            summary.species_folders.len()
        );
        Ok(summary)
    }
}

/// Render the organisation report.
pub fn render_report(summary: &OrganizationSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Wildlife Detector - Image Organization Report");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out);
    let _ = writeln!(out, "Run at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Output directory: {}", summary.base_folder.display());
    let _ = writeln!(out);
    let _ = writeln!(out, "=== Totals ===");
    let _ = writeln!(out, "Total images: {}", summary.total_images);
    let _ = writeln!(out, "Organized: {}", summary.processed_images);
    let _ = writeln!(out, "Failed: {}", summary.failed_images);
    let _ = writeln!(out, "No detection: {}", summary.no_detection_count);
    let _ = writeln!(out, "Multiple species: {}", summary.multiple_species_count);

    if !summary.species_folders.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "=== Species ===");
        let mut folders: Vec<_> = summary.species_folders.iter().collect();
        folders.sort_by(|a, b| b.1.file_count.cmp(&a.1.file_count).then_with(|| a.0.cmp(b.0)));
        for (folder, info) in folders {
            let _ = writeln!(out);
            let _ = writeln!(out, "{} ({})", info.species_name, info.scientific_name);
            let _ = writeln!(out, "  - Category: {}", info.category);
            let _ = writeln!(out, "  - Files: {}", info.file_count);
            let _ = writeln!(out, "  - Average confidence: {:.3}", info.avg_confidence);
            let _ = writeln!(out, "  - Folder: {folder}");
        }
    }

    if !summary.errors.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "=== Errors ===");
        for (file, error) in &summary.errors {
            let _ = writeln!(out, "- {}: {error}", file.display());
        }
    }

    out
}

fn write_report(path: &Path, summary: &OrganizationSummary) -> Result<()> {
    std::fs::write(path, render_report(summary))?;
    info!("Wrote organization report {}", path.display());
    Ok(())
}

/// Remove empty folders below `dir`, deepest first. Returns how many were
/// removed; `dir` itself is kept.
pub fn clean_empty_folders(dir: &Path) -> Result<usize> {
    fn collect(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                collect(&path, out)?;
                out.push(path);
            }
        }
        Ok(())
    }

    let mut folders = Vec::new();
    collect(dir, &mut folders)?;
    folders.sort_by_key(|p| std::cmp::Reverse(p.components().count()));

    let mut removed = 0;
    for folder in folders {
        // Fails for non-empty folders
        if std::fs::remove_dir(&folder).is_ok() {
            debug!("Removed empty folder {}", folder.display());
            removed += 1;
        }
    }
    info!("Removed {removed} empty folder(s) below {}", dir.display());
    Ok(removed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::output::types::tests::detection;
    use tempfile::TempDir;

    fn image(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"image bytes").unwrap();
        path
    }

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_sanitize_folder_name() {
        assert_eq!(sanitize_folder_name("Sika Deer"), "Sika Deer");
        assert_eq!(sanitize_folder_name("a<b>c:d"), "a_b_c_d");
        assert_eq!(sanitize_folder_name("x//??y"), "x_y");
        assert_eq!(sanitize_folder_name(" .deer. "), "deer");
        assert_eq!(sanitize_folder_name("..."), UNKNOWN_SPECIES_FOLDER);
        assert_eq!(sanitize_folder_name(""), UNKNOWN_SPECIES_FOLDER);
    }

    #[test]
    fn test_target_file_names() {
        let d = detection("Cervus nippon", "Sika Deer", Category::Mammal, 0.87654);
        let source = Path::new("/cam/IMG_0001.JPG");
        assert_eq!(
            target_file_name(source, &Placement::Species(&d)),
            "IMG_0001_Cervus nip_0.877.JPG"
        );
        assert_eq!(
            target_file_name(source, &Placement::Multiple(3)),
            "IMG_0001_multi_3species.JPG"
        );
        assert_eq!(
            target_file_name(source, &Placement::NoDetection),
            "IMG_0001_no_detection.JPG"
        );
    }

    #[test]
    fn test_avoid_collision_numbering() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a.jpg");
        assert_eq!(avoid_collision(&target), target);

        std::fs::write(&target, b"1").unwrap();
        assert_eq!(avoid_collision(&target), dir.path().join("a_001.jpg"));

        std::fs::write(dir.path().join("a_001.jpg"), b"2").unwrap();
        assert_eq!(avoid_collision(&target), dir.path().join("a_002.jpg"));
    }

    #[test]
    fn test_organize_copy() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let results = vec![
            DetectionResult::success(image(src.path(), "empty.jpg"), Vec::new(), 0.1),
            DetectionResult::success(
                image(src.path(), "deer.jpg"),
                vec![
                    detection("Cervus nippon", "Sika Deer", Category::Mammal, 0.9),
                    detection("Cervus nippon", "Sika Deer", Category::Mammal, 0.7),
                ],
                0.1,
            ),
            DetectionResult::success(
                image(src.path(), "mixed.jpg"),
                vec![
                    detection("Cervus nippon", "Sika Deer", Category::Mammal, 0.9),
                    detection("Vulpes vulpes", "Red Fox", Category::Mammal, 0.8),
                ],
                0.1,
            ),
            DetectionResult::success(
                image(src.path(), "weak.jpg"),
                vec![detection("Vulpes vulpes", "Red Fox", Category::Mammal, 0.2)],
                0.1,
            ),
            DetectionResult::failure(image(src.path(), "broken.jpg"), "decode failed", 0.1),
        ];

        let organizer = FileOrganizer::new(out.path(), "20240101_000000");
        let summary = organizer
            .organize(&results, TransferMode::Copy, 0.5)
            .unwrap();

        let base = out.path().join("organized_images_20240101_000000");
        assert_eq!(summary.base_folder, base);
        assert_eq!(summary.total_images, 5);
        assert_eq!(summary.processed_images, 4);
        assert_eq!(summary.failed_images, 1);
        assert_eq!(summary.no_detection_count, 2);
        assert_eq!(summary.multiple_species_count, 1);
        assert_eq!(summary.errors[0].1, "decode failed");

        assert_eq!(
            files_in(&base.join("no_detection")),
            vec!["empty_no_detection.jpg", "weak_no_detection.jpg"]
        );
        assert_eq!(
            files_in(&base.join("Sika Deer")),
            vec!["deer_Cervus nip_0.900.jpg"]
        );
        assert_eq!(
            files_in(&base.join("multiple_species")),
            vec!["mixed_multi_2species.jpg"]
        );

        let deer = &summary.species_folders["Sika Deer"];
        assert_eq!(deer.file_count, 1);
        assert!((deer.avg_confidence - 0.8).abs() < 1e-6);

        // Copy leaves sources in place
        assert!(src.path().join("deer.jpg").exists());
        // Failed detections are not placed
        assert!(!base.join("no_detection").join("broken_no_detection.jpg").exists());

        let report = std::fs::read_to_string(base.join(REPORT_FILE)).unwrap();
        assert!(report.contains("Total images: 5"));
        assert!(report.contains("Sika Deer (Cervus nippon)"));
        assert!(report.contains("decode failed"));
    }

    #[test]
    fn test_organize_move_and_collision() {
        let src = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let results = vec![
            DetectionResult::success(image(src.path(), "IMG_1.jpg"), Vec::new(), 0.1),
            DetectionResult::success(image(other.path(), "IMG_1.jpg"), Vec::new(), 0.1),
        ];

        let summary = FileOrganizer::new(out.path(), "20240101_000000")
            .organize(&results, TransferMode::Move, 0.5)
            .unwrap();

        assert_eq!(summary.processed_images, 2);
        assert!(!src.path().join("IMG_1.jpg").exists());
        assert!(!other.path().join("IMG_1.jpg").exists());
        assert_eq!(
            files_in(&summary.base_folder.join("no_detection")),
            vec!["IMG_1_no_detection.jpg", "IMG_1_no_detection_001.jpg"]
        );
    }

    #[test]
    fn test_missing_source_is_error() {
        let out = TempDir::new().unwrap();
        let results = vec![DetectionResult::success(
            PathBuf::from("/no/such/image.jpg"),
            Vec::new(),
            0.1,
        )];

        let summary = FileOrganizer::new(out.path(), "s")
            .organize(&results, TransferMode::Copy, 0.5)
            .unwrap();
        assert_eq!(summary.failed_images, 1);
        assert_eq!(summary.processed_images, 0);
        assert_eq!(summary.errors[0].1, "file not found");
    }

    #[test]
    fn test_clean_empty_folders() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        std::fs::create_dir_all(dir.path().join("keep")).unwrap();
        std::fs::write(dir.path().join("keep/file.txt"), b"x").unwrap();

        let removed = clean_empty_folders(dir.path()).unwrap();
        assert_eq!(removed, 3);
        assert!(!dir.path().join("a").exists());
        assert!(dir.path().join("keep/file.txt").exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn test_transfer_mode_from_sort_mode() {
        assert_eq!(TransferMode::from_sort_mode(SortMode::Off), None);
        assert_eq!(
            TransferMode::from_sort_mode(SortMode::Copy),
            Some(TransferMode::Copy)
        );
        assert_eq!(
            TransferMode::from_sort_mode(SortMode::Move),
            Some(TransferMode::Move)
        );
    }
}
