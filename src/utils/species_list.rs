//! Species allow-list file reading.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read a species allow-list from file.
///
/// # File Format
/// - One species per line, scientific or common name (e.g. `Cervus nippon`
///   or `Sika Deer`)
/// - `Scientific name_Common Name` lines contribute both names
/// - Blank lines and lines starting with `#` are ignored
///
/// Names are matched exactly against detections.
pub fn read_species_list(path: &Path) -> Result<HashSet<String>> {
    let file = File::open(path).map_err(|e| Error::SpeciesListRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reader = BufReader::new(file);
    let mut species = HashSet::new();

    for line in reader.lines() {
        let line = line.map_err(|e| Error::SpeciesListRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some((scientific, common)) = trimmed.split_once('_') {
            for name in [scientific.trim(), common.trim()] {
                if !name.is_empty() {
                    species.insert(name.to_string());
                }
            }
        } else {
            species.insert(trimmed.to_string());
        }
    }

    Ok(species)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test setup code - panics are acceptable
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_species_list_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# Hokkaido survey").unwrap();
        writeln!(file, "Cervus nippon").unwrap();
        writeln!(file).unwrap(); // blank line should be ignored
        writeln!(file, "Red Fox").unwrap();
        writeln!(file, "Ursus thibetanus_Asian Black Bear").unwrap();

        let species = read_species_list(file.path()).unwrap();
        assert_eq!(species.len(), 4);
        assert!(species.contains("Cervus nippon"));
        assert!(species.contains("Red Fox"));
        assert!(species.contains("Ursus thibetanus"));
        assert!(species.contains("Asian Black Bear"));
    }

    #[test]
    fn test_read_species_list_file_not_found() {
        let result = read_species_list(std::path::Path::new("nonexistent.txt"));
        assert!(matches!(result, Err(Error::SpeciesListRead { .. })));
    }
}
