//! Image validation.
//!
//! Only the image header is decoded: the detector reads the pixels itself,
//! this module just keeps obviously broken files out of the batch.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Basic facts about a validated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// File size in bytes.
    pub size_bytes: u64,
}

/// Check if a path has one of the supported image extensions.
pub fn is_image_file(path: &Path, formats: &[String]) -> bool {
    path.extension().is_some_and(|ext| {
        // Compare as OsStr so non-UTF-8 file names still match
        formats
            .iter()
            .any(|fmt| ext.eq_ignore_ascii_case(fmt.trim_start_matches('.')))
    })
}

/// Read image dimensions from the file header.
pub fn image_dimensions(path: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(path).map_err(|e| Error::ImageDecode {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Validate a single image: exists, non-empty, below the size limit and
/// with a decodable header.
pub fn validate_image(path: &Path, max_size_mb: f32) -> Result<ImageInfo> {
    let metadata = std::fs::metadata(path).map_err(|e| Error::InvalidImage {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if !metadata.is_file() {
        return Err(Error::InvalidImage {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        });
    }

    let size_bytes = metadata.len();
    if size_bytes == 0 {
        return Err(Error::InvalidImage {
            path: path.to_path_buf(),
            reason: "file is empty".to_string(),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let size_mb = size_bytes as f64 / BYTES_PER_MB;
    if size_mb > f64::from(max_size_mb) {
        return Err(Error::InvalidImage {
            path: path.to_path_buf(),
            reason: format!("file is {size_mb:.1} MB, limit is {max_size_mb:.1} MB"),
        });
    }

    let (width, height) = image_dimensions(path)?;

    Ok(ImageInfo {
        width,
        height,
        size_bytes,
    })
}

/// Validate a list of images, returning the valid ones and the rejected
/// ones with their error.
pub fn validate_images(paths: Vec<PathBuf>, max_size_mb: f32) -> (Vec<PathBuf>, Vec<(PathBuf, Error)>) {
    let mut valid = Vec::with_capacity(paths.len());
    let mut rejected = Vec::new();

    for path in paths {
        match validate_image(&path, max_size_mb) {
            Ok(_) => valid.push(path),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                rejected.push((path, e));
            }
        }
    }

    (valid, rejected)
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

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("deer.jpg"), &formats()));
        assert!(is_image_file(Path::new("deer.JPEG"), &formats()));
        assert!(is_image_file(Path::new("scan.tif"), &formats()));
        assert!(!is_image_file(Path::new("notes.txt"), &formats()));
        assert!(!is_image_file(Path::new("no_extension"), &formats()));
    }

    #[test]
    fn test_is_image_file_with_unicode() {
        assert!(is_image_file(Path::new("ニホンジカ_001.jpg"), &formats()));
        assert!(is_image_file(Path::new("räkä.png"), &formats()));
    }

    #[test]
    fn test_is_image_file_accepts_dotted_formats() {
        let formats = vec![".png".to_string()];
        assert!(is_image_file(Path::new("a.PNG"), &formats));
        assert!(!is_image_file(Path::new("a.jpg"), &formats));
    }

    #[test]
    fn test_validate_image_reads_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fox.png");
        image::RgbImage::new(8, 6).save(&path).unwrap();

        let info = validate_image(&path, 50.0).unwrap();
        assert_eq!((info.width, info.height), (8, 6));
        assert!(info.size_bytes > 0);
    }

    #[test]
    fn test_validate_image_rejects_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::File::create(&path).unwrap();

        let err = validate_image(&path, 50.0).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_validate_image_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        assert!(matches!(
            validate_image(&path, 50.0),
            Err(Error::ImageDecode { .. })
        ));
    }

    #[test]
    fn test_validate_images_splits_valid_and_rejected() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.png");
        let bad = dir.path().join("missing.png");
        image::RgbImage::new(2, 2).save(&good).unwrap();

        let (valid, rejected) = validate_images(vec![good.clone(), bad.clone()], 50.0);
        assert_eq!(valid, vec![good]);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, bad);
    }
}
