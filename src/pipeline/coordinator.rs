//! Input collection and output location.

use crate::config::{OutputConfig, default_output_dir};
use crate::error::{Error, Result};
use crate::imaging::is_image_file;
use crate::output::DetectionResult;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Collect image files from paths (files and directories).
///
/// The result is sorted and de-duplicated so every image is processed once
/// and results come out in a stable order.
pub fn collect_input_files(
    paths: &[PathBuf],
    recursive: bool,
    formats: &[String],
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_image_file(path, formats) {
                files.push(path.clone());
            } else {
                debug!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            collect_images(path, recursive, formats, &mut files)?;
        } else {
            warn!("Skipping non-existent path: {}", path.display());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Collect image files from a directory, descending if `recursive`.
fn collect_images(
    dir: &Path,
    recursive: bool,
    formats: &[String],
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            if recursive {
                collect_images(&path, recursive, formats, files)?;
            }
        } else if is_image_file(&path, formats) {
            files.push(path);
        }
    }

    Ok(())
}

/// Resolve the output directory: explicit path, then config, then the
/// per-user default. Creates it when `create_subdirectories` is set.
pub fn resolve_output_dir(explicit: Option<&Path>, output: &OutputConfig) -> Result<PathBuf> {
    let dir = match explicit.or(output.directory.as_deref()) {
        Some(dir) => dir.to_path_buf(),
        None => default_output_dir()?,
    };

    if !dir.exists() {
        if !output.create_subdirectories {
            return Err(Error::OutputDirCreateFailed {
                path: dir.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "directory does not exist and create_subdirectories is off",
                ),
            });
        }
        std::fs::create_dir_all(&dir).map_err(|e| Error::OutputDirCreateFailed {
            path: dir.clone(),
            source: e,
        })?;
    }

    Ok(dir)
}

/// Reorder `results` to follow `inputs`.
///
/// Results whose path is not in `inputs` keep their relative order at the end.
pub fn restore_input_order(results: &mut [DetectionResult], inputs: &[PathBuf]) {
    let position: HashMap<&Path, usize> = inputs
        .iter()
        .enumerate()
        .map(|(i, path)| (path.as_path(), i))
        .collect();
    results.sort_by_key(|r| {
        position
            .get(r.image_path.as_path())
            .copied()
            .unwrap_or(usize::MAX)
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::constants::IMAGE_EXTENSIONS;
    use tempfile::TempDir;

    fn formats() -> Vec<String> {
        IMAGE_EXTENSIONS.iter().map(ToString::to_string).collect()
    }

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_collect_sorted_and_deduplicated() {
        let dir = TempDir::new().unwrap();
        let b = dir.path().join("b.jpg");
        let a = dir.path().join("a.PNG");
        touch(&b);
        touch(&a);
        touch(&dir.path().join("notes.txt"));

        let files =
            collect_input_files(&[dir.path().to_path_buf(), b.clone()], true, &formats()).unwrap();
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn test_collect_recursive_flag() {
        let dir = TempDir::new().unwrap();
        let top = dir.path().join("top.jpg");
        let nested = dir.path().join("cam1").join("nested.jpg");
        touch(&top);
        touch(&nested);

        let flat = collect_input_files(&[dir.path().to_path_buf()], false, &formats()).unwrap();
        assert_eq!(flat, vec![top.clone()]);

        let deep = collect_input_files(&[dir.path().to_path_buf()], true, &formats()).unwrap();
        assert_eq!(deep, vec![nested, top]);
    }

    #[test]
    fn test_collect_skips_missing_paths() {
        let files =
            collect_input_files(&[PathBuf::from("/no/such/dir")], true, &formats()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_restore_input_order_interleaves_rejected() {
        let inputs: Vec<PathBuf> = ["a.jpg", "b.png", "c.png", "d.jpg"]
            .iter()
            .map(PathBuf::from)
            .collect();
        // Detected images first, validation failures appended afterwards
        let mut results = vec![
            DetectionResult::success(inputs[1].clone(), Vec::new(), 0.1),
            DetectionResult::success(inputs[2].clone(), Vec::new(), 0.1),
            DetectionResult::failure(inputs[0].clone(), "file is empty", 0.0),
            DetectionResult::failure(inputs[3].clone(), "file is empty", 0.0),
        ];

        restore_input_order(&mut results, &inputs);
        let order: Vec<&PathBuf> = results.iter().map(|r| &r.image_path).collect();
        assert_eq!(order, inputs.iter().collect::<Vec<_>>());
        assert!(!results[0].success);
        assert!(results[1].success);
    }

    #[test]
    fn test_restore_input_order_unknown_paths_last() {
        let inputs = vec![PathBuf::from("a.jpg")];
        let mut results = vec![
            DetectionResult::success(PathBuf::from("x.jpg"), Vec::new(), 0.1),
            DetectionResult::success(PathBuf::from("a.jpg"), Vec::new(), 0.1),
        ];

        restore_input_order(&mut results, &inputs);
        assert_eq!(results[0].image_path, PathBuf::from("a.jpg"));
        assert_eq!(results[1].image_path, PathBuf::from("x.jpg"));
    }

    #[test]
    fn test_resolve_output_dir_creates_directory() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out").join("run");
        let resolved = resolve_output_dir(Some(&target), &OutputConfig::default()).unwrap();
        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }

    #[test]
    fn test_resolve_output_dir_without_create() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing");
        let config = OutputConfig {
            create_subdirectories: false,
            ..OutputConfig::default()
        };
        assert!(matches!(
            resolve_output_dir(Some(&target), &config),
            Err(Error::OutputDirCreateFailed { .. })
        ));
    }
}
