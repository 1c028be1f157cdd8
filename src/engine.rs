//! The sort/extract engine.
//!
//! [`SortEngine`] owns the rule store and the manifest history and exposes the
//! operations a front end needs: planning and running a sort, undoing sorts,
//! and extracting archives.
//!
//! ```no_run
//! use archistack::engine::SortEngine;
//! use archistack::history::History;
//! use archistack::rule_store::RuleStore;
//! use std::path::Path;
//!
//! let rules = RuleStore::load("custom_criteria.json").expect("rules");
//! let mut engine = SortEngine::new(rules, History::in_memory());
//!
//! let active = engine.activate(&["Audio", "Images"]).expect("known rules");
//! let outcome = engine.sort(Path::new("/downloads"), &active).expect("sorted");
//! println!("moved {} files", outcome.manifest.len());
//!
//! let report = engine.undo_last().expect("something to undo");
//! println!("restored {} files", report.restored_files);
//! ```

use crate::config::{AppConfig, CompiledFilters, ConfigError};
use crate::criteria::{ActiveRules, DEFAULT_PRIORITY};
use crate::extract::{ExtractProgress, ExtractReport, ExtractResult, Extractor};
use crate::file_organizer::{
    FileOrganizer, MoveFailure, MoveManifest, OrganizeError, OrganizeResult, PlannedMove,
};
use crate::history::History;
use crate::rule_store::{RuleResult, RuleStore};
use crate::undo::{UndoManager, UndoReport};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of a sort.
#[derive(Debug)]
pub struct SortOutcome {
    /// Files that were moved. Also pushed on the history when not empty.
    pub manifest: MoveManifest,
    /// Files that stayed in place because their move failed.
    pub failures: Vec<MoveFailure>,
}

impl SortOutcome {
    /// True if every selected file was moved.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Holds the rules and the undo history for one caller.
pub struct SortEngine {
    rules: RuleStore,
    history: History,
    filters: CompiledFilters,
    priority: Vec<String>,
    extractor: Extractor,
}

impl SortEngine {
    /// Creates an engine with default filters, priority list and extraction chain.
    pub fn new(rules: RuleStore, history: History) -> Self {
        Self {
            rules,
            history,
            filters: CompiledFilters::default(),
            priority: DEFAULT_PRIORITY.iter().map(|s| s.to_string()).collect(),
            extractor: Extractor::default(),
        }
    }

    /// Creates an engine whose filters and priority list come from `config`.
    pub fn from_config(
        config: &AppConfig,
        rules: RuleStore,
        history: History,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(rules, history)
            .with_filters(config.compile_filters()?)
            .with_priority(config.sort.priority.clone()))
    }

    /// Replaces the file filters.
    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Replaces the priority list.
    pub fn with_priority(mut self, priority: Vec<String>) -> Self {
        self.priority = priority;
        self
    }

    /// Replaces the extraction chain.
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleStore {
        &mut self.rules
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Persists the history if it is file-backed.
    pub fn save_history(&self) -> OrganizeResult<()> {
        self.history.save()
    }

    /// Builds the active rule set for `names` using the engine's priority list.
    pub fn activate<S: AsRef<str>>(&self, names: &[S]) -> RuleResult<ActiveRules> {
        self.rules.activate(names, &self.priority)
    }

    /// Active rule set with every known rule.
    pub fn activate_all(&self) -> ActiveRules {
        self.rules.activate_all(&self.priority)
    }

    /// Works out where each file would go without touching anything.
    ///
    /// # Errors
    ///
    /// Same validation as [`SortEngine::sort`].
    pub fn plan(&self, directory: &Path, active: &ActiveRules) -> OrganizeResult<Vec<PlannedMove>> {
        let directory = validate(directory, active)?;
        let files = self.list_files(&directory)?;

        Ok(files
            .into_iter()
            .map(|path| {
                let group = active.group_for(&file_name_of(&path));
                PlannedMove {
                    source_path: path,
                    group,
                }
            })
            .collect())
    }

    /// Moves the top-level files of `directory` into their group folders.
    ///
    /// A failed move is collected in the outcome and the remaining files are
    /// still processed. The manifest lists only files that were moved and is
    /// pushed on the history when it is not empty.
    ///
    /// # Errors
    ///
    /// `InvalidDirectory` if `directory` is not a directory and
    /// `NoCriteriaSelected` if no rule was selected for `active`; both are checked before
    /// anything is moved.
    pub fn sort(&mut self, directory: &Path, active: &ActiveRules) -> OrganizeResult<SortOutcome> {
        let plan = self.plan(directory, active)?;
        let directory = resolve_directory(directory);

        let mut manifest = MoveManifest::new(self.history.next_id(), directory.clone());
        let mut failures = Vec::new();

        for planned in plan {
            match FileOrganizer::move_into_group(&directory, &planned.source_path, &planned.group)
            {
                Ok(moved) => {
                    manifest.add_record(moved.record);
                    manifest.created_dirs.extend(moved.created_dir);
                }
                Err(error) => failures.push(MoveFailure {
                    path: planned.source_path,
                    error,
                }),
            }
        }

        if !manifest.is_empty() {
            self.history.push(manifest.clone());
        }

        Ok(SortOutcome { manifest, failures })
    }

    /// Reverses `manifest`.
    ///
    /// On full success the manifest is dropped from the history. Otherwise the
    /// history keeps it with only the records that are still outstanding.
    pub fn undo(&mut self, manifest: &MoveManifest) -> UndoReport {
        let report = UndoManager::reverse(manifest);

        if report.is_complete_success() {
            self.history.remove(manifest.id);
        } else {
            let outstanding = report.unrestored();
            let mut remaining = manifest.clone();
            remaining.records.retain(|record| outstanding.contains(record));
            self.history.replace(remaining);
        }

        report
    }

    /// Reverses the most recent sort.
    ///
    /// # Errors
    ///
    /// `NothingToUndo` if the history is empty.
    pub fn undo_last(&mut self) -> OrganizeResult<UndoReport> {
        let manifest = self
            .history
            .last()
            .cloned()
            .ok_or(OrganizeError::NothingToUndo { directory: None })?;
        Ok(self.undo(&manifest))
    }

    /// Reverses every recorded sort of `directory`, most recent first, leaving
    /// sorts of other directories alone.
    ///
    /// # Errors
    ///
    /// `NothingToUndo` if no recorded sort matches `directory`.
    pub fn undo_for_directory(&mut self, directory: &Path) -> OrganizeResult<UndoReport> {
        let ids = self.history.ids_for_directory(directory);
        if ids.is_empty() {
            return Err(OrganizeError::NothingToUndo {
                directory: Some(directory.to_path_buf()),
            });
        }

        let mut report = UndoReport::default();
        for id in ids {
            if let Some(manifest) = self.history.get(id).cloned() {
                report.merge(self.undo(&manifest));
            }
        }
        Ok(report)
    }

    /// Extracts archives into `destination`; see [`Extractor::extract`].
    pub fn extract<F>(
        &self,
        archives: &[PathBuf],
        destination: &Path,
        progress: F,
    ) -> ExtractResult<ExtractReport>
    where
        F: FnMut(&ExtractProgress),
    {
        self.extractor.extract(archives, destination, progress)
    }

    fn list_files(&self, directory: &Path) -> OrganizeResult<Vec<PathBuf>> {
        let entries = fs::read_dir(directory).map_err(|e| OrganizeError::DirectoryReadFailed {
            path: directory.to_path_buf(),
            source: e,
        })?;

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .filter(|path| self.filters.should_include(path))
            .collect();

        // read_dir order is platform dependent.
        files.sort();
        Ok(files)
    }
}

fn validate(directory: &Path, active: &ActiveRules) -> OrganizeResult<PathBuf> {
    if !directory.is_dir() {
        return Err(OrganizeError::InvalidDirectory {
            path: directory.to_path_buf(),
        });
    }
    if !active.has_selection() {
        return Err(OrganizeError::NoCriteriaSelected);
    }
    Ok(resolve_directory(directory))
}

fn resolve_directory(directory: &Path) -> PathBuf {
    directory
        .canonicalize()
        .unwrap_or_else(|_| directory.to_path_buf())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
