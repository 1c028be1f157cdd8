//! The stack of sort manifests that can still be undone.
//!
//! A history lives in memory and can optionally be backed by a JSON file so that
//! an undo can happen in a later process than the sort.

use crate::file_organizer::{MoveManifest, OrganizeError, OrganizeResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Ordered manifests, oldest first.
#[derive(Debug, Clone, Default)]
pub struct History {
    manifests: Vec<MoveManifest>,
    path: Option<PathBuf>,
}

impl History {
    /// Creates an empty history that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the history stored at `path`; a missing file gives an empty history
    /// that will be saved to `path`.
    pub fn load(path: impl Into<PathBuf>) -> OrganizeResult<Self> {
        let path = path.into();

        if !path.exists() {
            return Ok(Self {
                manifests: Vec::new(),
                path: Some(path),
            });
        }

        let json = fs::read_to_string(&path).map_err(|e| OrganizeError::HistoryReadFailed {
            path: path.clone(),
            source: e,
        })?;

        let manifests: Vec<MoveManifest> =
            serde_json::from_str(&json).map_err(|e| OrganizeError::InvalidHistoryFormat {
                reason: format!("JSON parse error: {}", e),
            })?;

        Ok(Self {
            manifests,
            path: Some(path),
        })
    }

    /// Writes the history back to its file. In-memory histories are left alone.
    pub fn save(&self) -> OrganizeResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.manifests).map_err(|e| {
            OrganizeError::HistoryWriteFailed {
                path: path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("JSON serialization failed: {}", e),
                ),
            }
        })?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| OrganizeError::HistoryWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        }

        fs::write(path, json).map_err(|e| OrganizeError::HistoryWriteFailed {
            path: path.clone(),
            source: e,
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Identifier for the next manifest.
    pub fn next_id(&self) -> u64 {
        self.manifests.iter().map(|m| m.id).max().map_or(1, |id| id + 1)
    }

    /// Pushes a manifest on top of the stack.
    pub fn push(&mut self, manifest: MoveManifest) {
        self.manifests.push(manifest);
    }

    /// Most recent manifest.
    pub fn last(&self) -> Option<&MoveManifest> {
        self.manifests.last()
    }

    /// Looks up a manifest by id.
    pub fn get(&self, id: u64) -> Option<&MoveManifest> {
        self.manifests.iter().find(|m| m.id == id)
    }

    /// Removes a manifest by id.
    pub fn remove(&mut self, id: u64) -> Option<MoveManifest> {
        let index = self.manifests.iter().position(|m| m.id == id)?;
        Some(self.manifests.remove(index))
    }

    /// Replaces the manifest with the same id, keeping its position.
    pub fn replace(&mut self, manifest: MoveManifest) -> bool {
        match self.manifests.iter_mut().find(|m| m.id == manifest.id) {
            Some(slot) => {
                *slot = manifest;
                true
            }
            None => false,
        }
    }

    /// Ids of manifests recorded for `directory`, most recent first.
    ///
    /// Paths are compared after canonicalization when both sides can be resolved.
    pub fn ids_for_directory(&self, directory: &Path) -> Vec<u64> {
        let wanted = resolve(directory);
        self.manifests
            .iter()
            .rev()
            .filter(|m| resolve(&m.directory) == wanted)
            .map(|m| m.id)
            .collect()
    }

    /// All manifests, oldest first.
    pub fn manifests(&self) -> &[MoveManifest] {
        &self.manifests
    }

    /// Number of manifests.
    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    /// True when there is nothing to undo.
    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }
}

fn resolve(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_organizer::MoveRecord;
    use tempfile::TempDir;

    fn manifest(id: u64, dir: &Path) -> MoveManifest {
        let mut manifest = MoveManifest::new(id, dir.to_path_buf());
        manifest.add_record(MoveRecord {
            source_path: dir.join("a.txt"),
            destination_path: dir.join("Docs").join("a.txt"),
            originating_directory: dir.to_path_buf(),
            group: "Docs".to_string(),
        });
        manifest
    }

    #[test]
    fn test_next_id_increments() {
        let mut history = History::in_memory();
        assert_eq!(history.next_id(), 1);
        history.push(manifest(1, Path::new("/a")));
        history.push(manifest(7, Path::new("/b")));
        assert_eq!(history.next_id(), 8);
    }

    #[test]
    fn test_ids_for_directory_most_recent_first() {
        let mut history = History::in_memory();
        history.push(manifest(1, Path::new("/a")));
        history.push(manifest(2, Path::new("/b")));
        history.push(manifest(3, Path::new("/a")));

        assert_eq!(history.ids_for_directory(Path::new("/a")), vec![3, 1]);
        assert!(history.ids_for_directory(Path::new("/missing")).is_empty());
    }

    #[test]
    fn test_remove_and_replace() {
        let mut history = History::in_memory();
        history.push(manifest(1, Path::new("/a")));
        history.push(manifest(2, Path::new("/b")));

        let mut changed = manifest(1, Path::new("/a"));
        changed.records.clear();
        assert!(history.replace(changed));
        assert!(history.get(1).unwrap().is_empty());

        assert_eq!(history.remove(2).map(|m| m.id), Some(2));
        assert!(history.remove(2).is_none());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("state").join("history.json");

        let mut history = History::load(&path).unwrap();
        assert!(history.is_empty());
        history.push(manifest(1, temp_dir.path()));
        history.save().unwrap();

        let reloaded = History::load(&path).unwrap();
        assert_eq!(reloaded.manifests(), history.manifests());
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("history.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            History::load(&path),
            Err(OrganizeError::InvalidHistoryFormat { .. })
        ));
    }
}
