/// Moving files into group folders and recording what was moved.
///
/// Each move produces a [`MoveRecord`]; the records of one sort are collected in a
/// [`MoveManifest`] so the sort can be reversed later.
use crate::undo::UndoConflict;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A single file move performed by a sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Where the file was before the sort.
    pub source_path: PathBuf,
    /// Where the sort put it.
    pub destination_path: PathBuf,
    /// The directory that was sorted.
    pub originating_directory: PathBuf,
    /// The group (folder name) the file was assigned to.
    pub group: String,
}

/// The moves of one sort invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveManifest {
    /// Identifier, unique within one history.
    pub id: u64,
    /// RFC 3339 timestamp of the sort.
    pub timestamp: String,
    /// The directory that was sorted.
    pub directory: PathBuf,
    /// Moves in the order they happened.
    pub records: Vec<MoveRecord>,
    /// Group folders that did not exist before the sort.
    #[serde(default)]
    pub created_dirs: Vec<PathBuf>,
}

impl MoveManifest {
    /// Creates an empty manifest for `directory`.
    pub fn new(id: u64, directory: PathBuf) -> Self {
        Self {
            id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            directory,
            records: Vec::new(),
            created_dirs: Vec::new(),
        }
    }

    /// Appends a record.
    pub fn add_record(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    /// Number of files moved.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing was moved.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A file the sort intends to move, as shown by a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// The file as it is now.
    pub source_path: PathBuf,
    /// Group folder name it would be moved into.
    pub group: String,
}

/// A file the sort could not move.
#[derive(Debug)]
pub struct MoveFailure {
    /// The file that stayed in place.
    pub path: PathBuf,
    /// What went wrong.
    pub error: OrganizeError,
}

/// Errors that can occur while sorting or undoing.
#[derive(Debug)]
pub enum OrganizeError {
    /// The directory to sort does not exist or is not a directory.
    InvalidDirectory { path: PathBuf },
    /// The sort was requested with no active rules.
    NoCriteriaSelected,
    /// No recorded sort matches the undo request.
    NothingToUndo { directory: Option<PathBuf> },
    /// Some recorded files could not be restored.
    UndoConflict { conflicts: Vec<UndoConflict> },
    /// Failed to create a group directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file into its group directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Failed to list the directory being sorted.
    DirectoryReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write the history file.
    HistoryWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read the history file.
    HistoryReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// History file has invalid format.
    InvalidHistoryFormat { reason: String },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDirectory { path } => {
                write!(f, "Not a valid directory: {}", path.display())
            }
            Self::NoCriteriaSelected => {
                write!(f, "No sorting criteria selected; choose at least one rule")
            }
            Self::NothingToUndo { directory: Some(dir) } => {
                write!(f, "Nothing to undo for {}", dir.display())
            }
            Self::NothingToUndo { directory: None } => write!(f, "Nothing to undo"),
            Self::UndoConflict { conflicts } => {
                write!(f, "{} file(s) could not be restored", conflicts.len())
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::DirectoryReadFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::HistoryWriteFailed { path, source } => {
                write!(
                    f,
                    "Failed to write history file {}: {}",
                    path.display(),
                    source
                )
            }
            Self::HistoryReadFailed { path, source } => {
                write!(
                    f,
                    "Failed to read history file {}: {}",
                    path.display(),
                    source
                )
            }
            Self::InvalidHistoryFormat { reason } => {
                write!(f, "Invalid history file format: {}", reason)
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for sort and undo operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Outcome of a successful move.
#[derive(Debug)]
pub struct Moved {
    /// The record to store in the manifest.
    pub record: MoveRecord,
    /// The group folder, if this move had to create it.
    pub created_dir: Option<PathBuf>,
}

/// Moves files into group subdirectories of the directory being sorted.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves `file_path` into `<base_path>/<group>` and records the move.
    ///
    /// The group directory is created when missing. An existing file with the
    /// same name inside the group directory is never overwritten; the move fails
    /// instead.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use archistack::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let moved = FileOrganizer::move_into_group(
    ///     Path::new("/path/to/base"),
    ///     Path::new("/path/to/base/track.mp3"),
    ///     "Audio",
    /// );
    ///
    /// match moved {
    ///     Ok(m) => println!("Moved to {}", m.record.destination_path.display()),
    ///     Err(e) => eprintln!("Move failed: {}", e),
    /// }
    /// ```
    pub fn move_into_group(
        base_path: &Path,
        file_path: &Path,
        group: &str,
    ) -> OrganizeResult<Moved> {
        if !base_path.is_dir() {
            return Err(OrganizeError::InvalidDirectory {
                path: base_path.to_path_buf(),
            });
        }

        let group_path = base_path.join(group);

        let created_dir = if group_path.exists() {
            None
        } else {
            fs::create_dir(&group_path).map_err(|e| OrganizeError::DirectoryCreationFailed {
                path: group_path.clone(),
                source: e,
            })?;
            Some(group_path.clone())
        };

        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::FileMoveFailure {
                source: file_path.to_path_buf(),
                destination: group_path.clone(),
                source_error: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;

        let destination_path = group_path.join(file_name);

        if destination_path.exists() {
            return Err(OrganizeError::FileMoveFailure {
                source: file_path.to_path_buf(),
                destination: destination_path,
                source_error: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "a file with this name already exists in the group folder",
                ),
            });
        }

        fs::rename(file_path, &destination_path).map_err(|e| OrganizeError::FileMoveFailure {
            source: file_path.to_path_buf(),
            destination: destination_path.clone(),
            source_error: e,
        })?;

        Ok(Moved {
            record: MoveRecord {
                source_path: file_path.to_path_buf(),
                destination_path,
                originating_directory: base_path.to_path_buf(),
                group: group.to_string(),
            },
            created_dir,
        })
    }
}
