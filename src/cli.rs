//! Command-line interface module for archistack.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Loading configuration, rules and history
//! - Sort, dry-run, undo and extraction orchestration
//! - Custom rule management

use crate::config::AppConfig;
use crate::criteria::Rule;
use crate::engine::{SortEngine, SortOutcome};
use crate::history::History;
use crate::output::OutputFormatter;
use crate::rule_store::RuleStore;
use crate::undo::UndoReport;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Sort files into rule-based folders, extract archives, and undo sorts.
#[derive(Debug, Parser)]
#[command(name = "archistack", version, about)]
pub struct Cli {
    /// Configuration file (defaults to .archistackrc.toml or ~/.config/archistack/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sort the files of a directory into subfolders
    Sort {
        /// Directory whose top-level files are sorted
        directory: PathBuf,
        /// Rule to activate (repeatable)
        #[arg(short, long = "rule")]
        rules: Vec<String>,
        /// Activate every built-in and custom rule
        #[arg(long)]
        all: bool,
        /// Show what would happen without moving anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Undo the last sort, or every sort of DIRECTORY
    Undo {
        directory: Option<PathBuf>,
    },
    /// Extract zip, tar, 7z and rar archives
    Extract {
        #[arg(required = true)]
        archives: Vec<PathBuf>,
        /// Destination folder
        #[arg(short, long = "to")]
        destination: PathBuf,
    },
    /// Manage classification rules
    Rules {
        #[command(subcommand)]
        action: RulesCommand,
    },
}

/// Rule management commands.
#[derive(Debug, Clone, Subcommand)]
pub enum RulesCommand {
    /// List built-in and custom rules
    List,
    /// Add a custom rule
    Add {
        name: String,
        /// Extensions, comma separated (e.g. .txt,.log)
        #[arg(short, long = "ext", value_delimiter = ',')]
        extensions: Vec<String>,
        /// Filename pattern: wildcards (*, ?) or a regular expression; empty matches every name
        #[arg(short, long, default_value = "")]
        pattern: String,
    },
    /// Replace the extensions and pattern of a custom rule
    Edit {
        name: String,
        #[arg(short, long = "ext", value_delimiter = ',')]
        extensions: Vec<String>,
        #[arg(short, long, default_value = "")]
        pattern: String,
    },
    /// Remove a custom rule
    Remove { name: String },
}

/// Runs a parsed command line.
///
/// # Examples
///
/// ```no_run
/// use archistack::cli::{Cli, run_cli};
/// use clap::Parser;
///
/// let cli = Cli::parse_from(["archistack", "sort", "/downloads", "--rule", "Audio"]);
/// if let Err(e) = run_cli(cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: Cli) -> Result<(), String> {
    run_command(cli.command, cli.config.as_deref())
}

/// Runs a single command with an optional configuration file.
pub fn run_command(command: Command, config_path: Option<&Path>) -> Result<(), String> {
    let config = AppConfig::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let mut engine = build_engine(&config)?;

    match command {
        Command::Sort {
            directory,
            rules,
            all,
            dry_run,
        } => {
            if dry_run {
                sort_dry_run(&engine, &directory, &rules, all)
            } else {
                sort_directory(&mut engine, &directory, &rules, all)
            }
        }
        Command::Undo { directory } => undo(&mut engine, directory.as_deref()),
        Command::Extract {
            archives,
            destination,
        } => extract(&engine, &archives, &destination),
        Command::Rules { action } => manage_rules(&mut engine, action),
    }
}

fn build_engine(config: &AppConfig) -> Result<SortEngine, String> {
    let rules = RuleStore::load(config.rules_path()).map_err(|e| e.to_string())?;
    let history = History::load(config.history_path()).map_err(|e| e.to_string())?;
    SortEngine::from_config(config, rules, history)
        .map_err(|e| format!("Error compiling filters: {}", e))
}

fn select_rules(
    engine: &SortEngine,
    names: &[String],
    all: bool,
) -> Result<crate::criteria::ActiveRules, String> {
    if all {
        Ok(engine.activate_all())
    } else {
        engine.activate(names).map_err(|e| e.to_string())
    }
}

/// Sorts the top-level files of `directory` and records the sort for undo.
fn sort_directory(
    engine: &mut SortEngine,
    directory: &Path,
    names: &[String],
    all: bool,
) -> Result<(), String> {
    let active = select_rules(engine, names, all)?;
    OutputFormatter::info(&format!("Sorting contents of: {}", directory.display()));

    let outcome = engine.sort(directory, &active).map_err(|e| e.to_string())?;
    report_sort(&outcome);

    if outcome.manifest.is_empty() {
        OutputFormatter::plain("No files were moved.");
        return Ok(());
    }

    match engine.save_history() {
        Ok(()) => {
            OutputFormatter::success("Files sorted successfully.");
            OutputFormatter::plain(&format!(
                "Use 'archistack undo {}' to revert changes.",
                directory.display()
            ));
        }
        Err(e) => {
            OutputFormatter::warning(&format!("Could not save history: {}", e));
            OutputFormatter::warning("Undo will not be available after this run.");
        }
    }

    if !outcome.is_complete_success() {
        OutputFormatter::warning("Some files could not be sorted. Please review errors above.");
    }

    Ok(())
}

fn report_sort(outcome: &SortOutcome) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in &outcome.manifest.records {
        OutputFormatter::plain(&format!(
            " - {} → {}/",
            record
                .source_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            record.group
        ));
        *counts.entry(record.group.clone()).or_insert(0) += 1;
    }

    for failure in &outcome.failures {
        OutputFormatter::error(&format!("{}: {}", failure.path.display(), failure.error));
    }

    if !counts.is_empty() {
        OutputFormatter::group_table(&counts, outcome.manifest.len());
    }
}

/// Shows where each file would go without moving anything.
fn sort_dry_run(
    engine: &SortEngine,
    directory: &Path,
    names: &[String],
    all: bool,
) -> Result<(), String> {
    let active = select_rules(engine, names, all)?;
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", directory.display()));

    let plan = engine.plan(directory, &active).map_err(|e| e.to_string())?;
    if plan.is_empty() {
        OutputFormatter::plain("No files found to sort.");
        return Ok(());
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for planned in &plan {
        OutputFormatter::plain(&format!(
            " - {} → would move to {}/",
            planned
                .source_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            planned.group
        ));
        *counts.entry(planned.group.clone()).or_insert(0) += 1;
    }
    OutputFormatter::group_table(&counts, plan.len());

    OutputFormatter::dry_run_notice("Complete. No files were modified.");
    Ok(())
}

fn undo(engine: &mut SortEngine, directory: Option<&Path>) -> Result<(), String> {
    OutputFormatter::info("Undoing previous sort...");

    let report = match directory {
        Some(dir) => engine.undo_for_directory(dir),
        None => engine.undo_last(),
    }
    .map_err(|e| e.to_string())?;

    if let Err(e) = engine.save_history() {
        OutputFormatter::warning(&format!("Could not save history: {}", e));
    }

    report_undo(&report);
    report.into_result().map(|_| ()).map_err(|e| e.to_string())
}

fn report_undo(report: &UndoReport) {
    OutputFormatter::success(&format!("Restored: {}", report.restored_files));

    for backup in &report.backups {
        OutputFormatter::warning(&format!(
            "A file was in the way and was renamed to {}",
            backup.display()
        ));
    }

    for conflict in report.conflicts.iter().chain(report.failed_restores.iter()) {
        OutputFormatter::error(&format!(
            "{}: {}",
            conflict.record.destination_path.display(),
            conflict.reason
        ));
    }

    if !report.is_complete_success() {
        OutputFormatter::warning(
            "Unrestored files stay in the history. Fix the issues and run undo again.",
        );
    }
}

fn extract(engine: &SortEngine, archives: &[PathBuf], destination: &Path) -> Result<(), String> {
    let pb = OutputFormatter::create_progress_bar(archives.len() as u64);

    let result = engine.extract(archives, destination, |progress| {
        pb.set_length(progress.total as u64);
        pb.set_position(progress.completed as u64);
        pb.set_message(
            progress
                .current
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
    });
    pb.finish_and_clear();

    let report = result.map_err(|e| e.to_string())?;

    for skipped in &report.skipped {
        OutputFormatter::warning(&format!("Skipped unsupported file {}", skipped.display()));
    }
    for extracted in &report.extracted {
        OutputFormatter::success(&format!("Extracted {}", extracted.path.display()));
    }
    for failure in &report.failures {
        OutputFormatter::error(&format!(
            "Failed to extract {}: {}",
            failure.path.display(),
            failure.reasons.join("; ")
        ));
    }

    if report.is_complete_success() {
        OutputFormatter::success("Files extracted successfully.");
    } else {
        OutputFormatter::warning(&format!(
            "{} of {} archives could not be extracted.",
            report.failures.len(),
            report.failures.len() + report.extracted.len()
        ));
    }
    Ok(())
}

fn manage_rules(engine: &mut SortEngine, action: RulesCommand) -> Result<(), String> {
    let store = engine.rules_mut();
    match action {
        RulesCommand::List => {
            OutputFormatter::header("Built-in rules");
            for rule in store.built_in_rules() {
                OutputFormatter::plain(&describe_rule(rule));
            }
            OutputFormatter::header("Custom rules");
            if store.custom_rules().is_empty() {
                OutputFormatter::plain("  (none)");
            }
            for rule in store.custom_rules() {
                OutputFormatter::plain(&describe_rule(rule));
            }
            Ok(())
        }
        RulesCommand::Add {
            name,
            extensions,
            pattern,
        } => {
            store
                .add(&name, extensions, &pattern)
                .map_err(|e| e.to_string())?;
            OutputFormatter::success(&format!("Custom rule '{}' added.", name));
            Ok(())
        }
        RulesCommand::Edit {
            name,
            extensions,
            pattern,
        } => {
            store
                .edit(&name, extensions, &pattern)
                .map_err(|e| e.to_string())?;
            OutputFormatter::success(&format!("Custom rule '{}' updated.", name));
            Ok(())
        }
        RulesCommand::Remove { name } => {
            store.remove(&name).map_err(|e| e.to_string())?;
            OutputFormatter::success(&format!("Custom rule '{}' removed.", name));
            Ok(())
        }
    }
}

fn describe_rule(rule: &Rule) -> String {
    let pattern = if rule.pattern.is_empty() {
        "(any name)"
    } else {
        rule.pattern.as_str()
    };
    format!(
        "  {}  [{}]  pattern: {}\n      {}",
        rule.name,
        rule.extensions.join(", "),
        pattern,
        rule.description()
    )
}
