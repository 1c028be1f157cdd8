//! archistack - sort files into rule-based folders, extract archives, undo sorts
//!
//! This library classifies the files of a directory by extension and name
//! pattern, moves them into group subfolders, records every move so the sort
//! can be reversed, and extracts zip, tar, 7z and rar archives through a
//! fallback chain of extraction strategies.

pub mod cli;
pub mod config;
pub mod criteria;
pub mod engine;
pub mod extract;
pub mod file_organizer;
pub mod history;
pub mod output;
pub mod rule_store;
pub mod undo;

pub use config::{AppConfig, CompiledFilters, ConfigError};
pub use criteria::{ActiveRules, Rule, RuleOrigin};
pub use engine::{SortEngine, SortOutcome};
pub use extract::{ExtractError, ExtractReport, ExtractStrategy, Extractor};
pub use file_organizer::{MoveManifest, MoveRecord, OrganizeError};
pub use history::History;
pub use rule_store::{RuleError, RuleStore};
pub use undo::{UndoConflict, UndoManager, UndoReport};

pub use cli::{Cli, run_cli};
