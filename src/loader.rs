//! This module provides the `SystemLoader` struct, responsible for loading system
//! documents from various sources, including files and strings.

use crate::types::{SimulationError, SystemConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// `SystemLoader` is a utility struct for loading system documents: JSON
/// descriptions of a tape pool plus the machines running on it. It provides
/// methods to load a document from a file, from string content, and to
/// discover and load all `.json` documents within a directory.
pub struct SystemLoader;

impl SystemLoader {
    /// Loads a single system document from the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the `.json` document to load.
    ///
    /// # Returns
    ///
    /// * `Ok(SystemConfig)` if the file is successfully read and parsed.
    /// * `Err(SimulationError::FileError)` if the file cannot be read.
    /// * `Err(SimulationError::ParseError)` if the content is not a valid document.
    pub fn load_system(path: &Path) -> Result<SystemConfig, SimulationError> {
        let content = fs::read_to_string(path).map_err(|e| {
            SimulationError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::load_system_from_string(&content)
    }

    /// Loads a single system document from the provided string content.
    ///
    /// This is useful for documents that are not stored in files, e.g. those
    /// received from a surrounding server layer.
    ///
    /// # Arguments
    ///
    /// * `content` - A string slice containing the JSON document.
    ///
    /// # Returns
    ///
    /// * `Ok(SystemConfig)` if the content parses.
    /// * `Err(SimulationError::ParseError)` otherwise.
    pub fn load_system_from_string(content: &str) -> Result<SystemConfig, SimulationError> {
        serde_json::from_str(content).map_err(|e| SimulationError::ParseError(e.to_string()))
    }

    /// Loads all system documents (`.json` extension) from a given directory.
    ///
    /// It iterates through the directory, attempts to load each `.json` file,
    /// and collects the results. Directories and other files are skipped.
    ///
    /// # Arguments
    ///
    /// * `directory` - A reference to the `Path` of the directory to scan.
    ///
    /// # Returns
    ///
    /// * `Vec<Result<(PathBuf, SystemConfig), SimulationError>>` - one entry
    ///   per document, successfully loaded (with its path) or failed (with
    ///   the error).
    pub fn load_systems(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, SystemConfig), SimulationError>> {
        if !directory.exists() {
            return vec![Err(SimulationError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(SimulationError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(SimulationError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                // Skip directories and non-.json files
                if path.is_dir() || path.extension().is_none_or(|ext| ext != "json") {
                    return None;
                }

                match Self::load_system(&path) {
                    Ok(config) => Some(Ok((path, config))),
                    Err(e) => Some(Err(SimulationError::FileError(format!(
                        "Failed to load system from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID_DOCUMENT: &str = r#"{
        "name": "Test System",
        "tapes": [
            { "topology": "Infinite", "content": "ab" }
        ],
        "machines": [
            {
                "head_count": 1,
                "capabilities": ["ReadWrite"],
                "positions": [0],
                "tapes": [0],
                "nodes": [0, 1],
                "statements": [
                    {
                        "source": 0,
                        "target": 1,
                        "heads": [ { "read": "a", "write": "b", "shift": 1 } ]
                    }
                ],
                "start_node": 0
            }
        ]
    }"#;

    #[test]
    fn test_load_valid_document() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.json");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(VALID_DOCUMENT.as_bytes()).unwrap();

        let config = SystemLoader::load_system(&file_path).unwrap();
        assert_eq!(config.name, "Test System");
        assert_eq!(config.tapes.len(), 1);
        assert_eq!(config.machines[0].head_count, 1);
        assert_eq!(config.machines[0].statements[0].heads[0].read, Some('a'));
    }

    #[test]
    fn test_load_invalid_document() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.json");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"This is not a valid document").unwrap();

        let result = SystemLoader::load_system(&file_path);
        assert!(matches!(result, Err(SimulationError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = SystemLoader::load_system(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(SimulationError::FileError(_))));
    }

    #[test]
    fn test_load_systems_from_directory() {
        let dir = tempdir().unwrap();

        let mut valid = File::create(dir.path().join("valid.json")).unwrap();
        valid.write_all(VALID_DOCUMENT.as_bytes()).unwrap();

        let mut invalid = File::create(dir.path().join("invalid.json")).unwrap();
        invalid.write_all(b"not a document").unwrap();

        let mut ignored = File::create(dir.path().join("ignored.txt")).unwrap();
        ignored.write_all(b"should be skipped").unwrap();

        let results = SystemLoader::load_systems(dir.path());
        assert_eq!(results.len(), 2);

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let failures = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(successes, 1);
        assert_eq!(failures, 1);
    }

    #[test]
    fn test_document_round_trips_through_serde() {
        let config = SystemLoader::load_system_from_string(VALID_DOCUMENT).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back = SystemLoader::load_system_from_string(&json).unwrap();
        assert_eq!(config, back);
    }
}
