//! Export of all CSV files for a run.

use crate::error::Result;
use crate::output::{
    DetectionResult, OutputFiles, write_results_csv, write_species_list_csv, write_summary_csv,
};
use std::path::Path;
use tracing::info;

/// Write the results, summary and species list CSVs with a shared stamp.
///
/// Returns the paths of all run files; the JSON summary path is reserved
/// but not written here.
pub fn export_all(
    results: &[DetectionResult],
    dir: &Path,
    prefix: &str,
    stamp: &str,
    bom: bool,
) -> Result<OutputFiles> {
    let files = OutputFiles::new(dir, prefix, stamp);

    write_results_csv(results, &files.results, bom)?;
    write_summary_csv(results, &files.summary, bom)?;
    write_species_list_csv(results, &files.species_list, bom)?;

    info!("Wrote {}", files.results.display());
    info!("Wrote {}", files.summary.display());
    info!("Wrote {}", files.species_list.display());
    Ok(files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::output::Category;
    use crate::output::types::tests::detection;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_export_all_writes_three_files() {
        let dir = TempDir::new().unwrap();
        let results = vec![DetectionResult::success(
            PathBuf::from("a.jpg"),
            vec![detection("Vulpes vulpes", "Red Fox", Category::Mammal, 0.8)],
            0.2,
        )];

        let files =
            export_all(&results, dir.path(), "wildlife_detection", "20240101_120000", true)
                .unwrap();

        assert!(files.results.is_file());
        assert!(files.summary.is_file());
        assert!(files.species_list.is_file());
        assert!(!files.summary_json.exists());

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "wildlife_detection_20240101_120000_results.csv",
                "wildlife_detection_20240101_120000_species_list.csv",
                "wildlife_detection_20240101_120000_summary.csv",
            ]
        );
    }
}
