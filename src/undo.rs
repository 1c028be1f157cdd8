/// Reversing recorded sorts.
///
/// This module moves files back to where a [`MoveManifest`] says they came from
/// and reports anything that could not be restored.
use crate::file_organizer::{MoveManifest, MoveRecord, OrganizeError, OrganizeResult};
use std::fs;
use std::path::{Path, PathBuf};

/// A recorded move that could not be reversed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoConflict {
    /// The record that is still outstanding.
    pub record: MoveRecord,
    /// Why it could not be restored.
    pub reason: String,
}

/// Result of reversing one or more manifests.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Number of files moved back.
    pub restored_files: usize,
    /// Records whose file is no longer where the sort put it.
    pub conflicts: Vec<UndoConflict>,
    /// Records whose file was found but could not be moved back.
    pub failed_restores: Vec<UndoConflict>,
    /// Files that were in the way at an original location and got renamed.
    pub backups: Vec<PathBuf>,
    /// Group folders removed because the undo emptied them.
    pub removed_dirs: Vec<PathBuf>,
}

impl UndoReport {
    /// Total number of records processed.
    pub fn total_processed(&self) -> usize {
        self.restored_files + self.conflicts.len() + self.failed_restores.len()
    }

    /// Returns true if every record was restored.
    pub fn is_complete_success(&self) -> bool {
        self.conflicts.is_empty() && self.failed_restores.is_empty()
    }

    /// Records that are still outstanding, missing files first.
    pub fn unrestored(&self) -> Vec<MoveRecord> {
        self.conflicts
            .iter()
            .chain(self.failed_restores.iter())
            .map(|conflict| conflict.record.clone())
            .collect()
    }

    /// Folds another report into this one.
    pub fn merge(&mut self, other: UndoReport) {
        self.restored_files += other.restored_files;
        self.conflicts.extend(other.conflicts);
        self.failed_restores.extend(other.failed_restores);
        self.backups.extend(other.backups);
        self.removed_dirs.extend(other.removed_dirs);
    }

    /// Turns an incomplete undo into `OrganizeError::UndoConflict`.
    pub fn into_result(self) -> OrganizeResult<UndoReport> {
        if self.is_complete_success() {
            Ok(self)
        } else {
            let mut conflicts = self.conflicts;
            conflicts.extend(self.failed_restores);
            Err(OrganizeError::UndoConflict { conflicts })
        }
    }
}

enum RestoreError {
    Missing(String),
    Failed(String),
}

/// Reverses manifests on disk. History bookkeeping is left to the caller.
pub struct UndoManager;

impl UndoManager {
    /// Moves every file of `manifest` back, last move first.
    ///
    /// A record whose file is gone from its sorted location becomes a conflict;
    /// the remaining records are still processed. If every record is restored,
    /// group folders created by the sort are removed when empty.
    ///
    /// # Edge Cases Handled
    ///
    /// * **File not found**: recorded in `conflicts`
    /// * **Original location occupied**: the occupant is renamed with a timestamp suffix
    /// * **Permission denied**: recorded in `failed_restores`
    pub fn reverse(manifest: &MoveManifest) -> UndoReport {
        let mut report = UndoReport::default();

        for record in manifest.records.iter().rev() {
            match Self::restore_file(record) {
                Ok(backup) => {
                    report.restored_files += 1;
                    report.backups.extend(backup);
                }
                Err(RestoreError::Missing(reason)) => report.conflicts.push(UndoConflict {
                    record: record.clone(),
                    reason,
                }),
                Err(RestoreError::Failed(reason)) => {
                    report.failed_restores.push(UndoConflict {
                        record: record.clone(),
                        reason,
                    })
                }
            }
        }

        if report.is_complete_success() {
            for dir in manifest.created_dirs.iter().rev() {
                // Only succeeds on empty directories.
                if fs::remove_dir(dir).is_ok() {
                    report.removed_dirs.push(dir.clone());
                }
            }
        }

        report
    }

    /// Restores a single file, returning the backup path if something was in the way.
    fn restore_file(record: &MoveRecord) -> Result<Option<PathBuf>, RestoreError> {
        if !record.destination_path.is_file() {
            return Err(RestoreError::Missing(
                "File not found at sorted location".to_string(),
            ));
        }

        let mut backup = None;
        if record.source_path.exists() {
            let backup_path = Self::generate_backup_path(&record.source_path);
            fs::rename(&record.source_path, &backup_path).map_err(|e| {
                RestoreError::Failed(format!("Could not back up conflicting file: {}", e))
            })?;
            backup = Some(backup_path);
        }

        fs::rename(&record.destination_path, &record.source_path)
            .map_err(|e| RestoreError::Failed(format!("Failed to restore file: {}", e)))?;

        Ok(backup)
    }

    /// Generates a backup path for a file by appending a timestamp.
    ///
    /// Example: `file.txt` becomes `file.txt.bak.20251109-143052`
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = original_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());

        let backup_name = format!("{}.bak.{}", filename, timestamp);

        match original_path.parent() {
            Some(parent) => parent.join(backup_name),
            None => PathBuf::from(backup_name),
        }
    }
}
