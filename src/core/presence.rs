//! Local presence index for already-downloaded videos

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::RtikError;
use crate::utils::filename::MEDIA_EXT;

/// Set of media filenames present in a target directory.
///
/// Built from one directory listing taken at sync start. The filesystem is
/// never re-read afterwards; videos downloaded during the run are recorded
/// through [`PresenceIndex::insert`] instead.
#[derive(Debug, Default)]
pub struct PresenceIndex {
    files: HashSet<String>,
}

impl PresenceIndex {
    /// Snapshot the media files in `dir`.
    ///
    /// Only regular files with the media extension count; subdirectories and
    /// other files are ignored. The caller is responsible for the directory
    /// existing.
    pub fn scan(dir: &Path) -> Result<Self, RtikError> {
        let mut files = HashSet::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|source| RtikError::Directory {
                path: dir.to_path_buf(),
                source: source.into(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().map_or(false, |ext| ext == MEDIA_EXT) {
                files.insert(entry.file_name().to_string_lossy().into_owned());
            }
        }

        debug!("Indexed {} existing videos in {}", files.len(), dir.display());
        Ok(Self { files })
    }

    /// Check whether a canonical filename is already present
    pub fn contains(&self, filename: &str) -> bool {
        self.files.contains(filename)
    }

    /// Record a filename downloaded during this run
    pub fn insert(&mut self, filename: String) -> bool {
        self.files.insert(filename)
    }

    /// Number of indexed files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_collects_only_media_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("alice_2023-07-22_123.mp4"), b"v").unwrap();
        fs::write(dir.path().join("alice_2023-07-23_124.mp4"), b"v").unwrap();
        fs::write(dir.path().join("notes.txt"), b"t").unwrap();
        fs::create_dir(dir.path().join("nested.mp4")).unwrap();
        fs::write(dir.path().join("nested.mp4").join("deep.mp4"), b"v").unwrap();

        let index = PresenceIndex::scan(dir.path()).unwrap();

        assert_eq!(index.len(), 2);
        assert!(index.contains("alice_2023-07-22_123.mp4"));
        assert!(index.contains("alice_2023-07-23_124.mp4"));
        assert!(!index.contains("notes.txt"));
        assert!(!index.contains("deep.mp4"));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let index = PresenceIndex::scan(dir.path()).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = PresenceIndex::scan(&missing).unwrap_err();
        match err {
            RtikError::Directory { path, .. } => assert_eq!(path, missing),
            other => panic!("expected Directory error, got {:?}", other),
        }
    }

    #[test]
    fn test_index_is_a_point_in_time_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let index = PresenceIndex::scan(dir.path()).unwrap();

        fs::write(dir.path().join("bob_2022-01-01_10.mp4"), b"v").unwrap();
        assert!(!index.contains("bob_2022-01-01_10.mp4"));
    }

    #[test]
    fn test_insert_records_new_downloads() {
        let mut index = PresenceIndex::default();

        assert!(index.insert("bob_2022-01-01_10.mp4".to_string()));
        assert!(index.contains("bob_2022-01-01_10.mp4"));

        // Second insert of the same name reports a duplicate
        assert!(!index.insert("bob_2022-01-01_10.mp4".to_string()));
        assert_eq!(index.len(), 1);
    }
}
