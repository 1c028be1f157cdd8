//! Built-in and custom rule storage.
//!
//! Custom rules live in a JSON document mapping each rule name to its
//! extensions and pattern:
//!
//! ```json
//! {
//!   "My Logs": { "extensions": [".log", ".txt"], "pattern": "*log*" }
//! }
//! ```
//!
//! Key order is preserved so that custom rules keep their evaluation order
//! across save/load.

use crate::criteria::{ActiveRules, NamePattern, Rule, RuleOrigin, built_in_rules};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised by the rule store.
#[derive(Debug)]
pub enum RuleError {
    /// A built-in or custom rule already uses this name.
    DuplicateName { name: String },
    /// No custom rule (or, for activation, no rule at all) has this name.
    NotFound { name: String },
    /// The rule name cannot be used as a folder name.
    InvalidName { name: String, reason: String },
    /// The pattern is neither a valid glob nor a valid regex.
    InvalidPattern { pattern: String, reason: String },
    /// Reading or writing the rules file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The rules file is not a valid rule document.
    InvalidFormat { path: PathBuf, reason: String },
}

impl std::fmt::Display for RuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateName { name } => write!(f, "A rule named '{}' already exists", name),
            Self::NotFound { name } => write!(f, "No custom rule named '{}'", name),
            Self::InvalidName { name, reason } => {
                write!(f, "Invalid rule name '{}': {}", name, reason)
            }
            Self::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid pattern '{}': {}", pattern, reason)
            }
            Self::Io { path, source } => {
                write!(f, "Could not access rules file {}: {}", path.display(), source)
            }
            Self::InvalidFormat { path, reason } => {
                write!(f, "Invalid rules file {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for RuleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for rule store operations.
pub type RuleResult<T> = Result<T, RuleError>;

/// On-disk shape of one custom rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleDocument {
    #[serde(default)]
    extensions: Vec<String>,
    #[serde(default)]
    pattern: String,
}

/// Holds the built-in rules and the persisted custom rules.
#[derive(Debug, Clone)]
pub struct RuleStore {
    path: PathBuf,
    built_in: Vec<Rule>,
    custom: Vec<Rule>,
}

impl RuleStore {
    /// Loads custom rules from `path`. A missing file yields an empty custom set.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::Io` if the file exists but cannot be read, and
    /// `RuleError::InvalidFormat` if it is not a JSON object of rule documents.
    pub fn load(path: impl Into<PathBuf>) -> RuleResult<Self> {
        let path = path.into();
        let mut store = Self {
            path,
            built_in: built_in_rules(),
            custom: Vec::new(),
        };

        if !store.path.exists() {
            return Ok(store);
        }

        let content = fs::read_to_string(&store.path).map_err(|e| RuleError::Io {
            path: store.path.clone(),
            source: e,
        })?;

        let document: Map<String, Value> =
            serde_json::from_str(&content).map_err(|e| RuleError::InvalidFormat {
                path: store.path.clone(),
                reason: e.to_string(),
            })?;

        for (name, value) in document {
            let body: RuleDocument =
                serde_json::from_value(value).map_err(|e| RuleError::InvalidFormat {
                    path: store.path.clone(),
                    reason: format!("rule '{}': {}", name, e),
                })?;
            if store.built_in.iter().any(|rule| rule.name == name) {
                return Err(RuleError::InvalidFormat {
                    path: store.path.clone(),
                    reason: format!("rule '{}' shadows a built-in rule", name),
                });
            }
            store.custom.push(Rule::new(
                &name,
                body.extensions,
                &body.pattern,
                RuleOrigin::Custom,
            ));
        }

        Ok(store)
    }

    /// Writes the custom rules to the rules file, creating its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::Io` if the file cannot be written.
    pub fn save(&self) -> RuleResult<()> {
        self.write(&self.custom)
    }

    /// Saves `custom` and only then makes it the in-memory set, so a failed
    /// write leaves the store as it was.
    fn commit(&mut self, custom: Vec<Rule>) -> RuleResult<()> {
        self.write(&custom)?;
        self.custom = custom;
        Ok(())
    }

    fn write(&self, custom: &[Rule]) -> RuleResult<()> {
        let mut document = Map::new();
        for rule in custom {
            let body = RuleDocument {
                extensions: rule.extensions.clone(),
                pattern: rule.pattern.clone(),
            };
            let value = serde_json::to_value(body).map_err(|e| RuleError::InvalidFormat {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
            document.insert(rule.name.clone(), value);
        }

        let json = serde_json::to_string_pretty(&Value::Object(document)).map_err(|e| {
            RuleError::InvalidFormat {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| RuleError::Io {
                path: self.path.clone(),
                source: e,
            })?;
        }

        fs::write(&self.path, json).map_err(|e| RuleError::Io {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Path of the rules file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All rules: built-in first, then custom, each in their own order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.built_in.iter().chain(self.custom.iter())
    }

    /// Built-in rules only.
    pub fn built_in_rules(&self) -> &[Rule] {
        &self.built_in
    }

    /// Custom rules only.
    pub fn custom_rules(&self) -> &[Rule] {
        &self.custom
    }

    /// Looks up any rule by name.
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules().find(|rule| rule.name == name)
    }

    /// Adds a custom rule and saves.
    ///
    /// # Errors
    ///
    /// `DuplicateName` if any rule already has this name, `InvalidName` or
    /// `InvalidPattern` for unusable input, `Io` if saving fails.
    pub fn add(&mut self, name: &str, extensions: Vec<String>, pattern: &str) -> RuleResult<()> {
        validate_name(name)?;
        if self.get(name).is_some() {
            return Err(RuleError::DuplicateName {
                name: name.to_string(),
            });
        }
        validate_pattern(pattern)?;

        let mut custom = self.custom.clone();
        custom.push(Rule::new(name, extensions, pattern, RuleOrigin::Custom));
        self.commit(custom)
    }

    /// Removes a custom rule and saves. Built-in rules cannot be removed.
    ///
    /// # Errors
    ///
    /// `NotFound` if `name` is not a custom rule, `Io` if saving fails.
    pub fn remove(&mut self, name: &str) -> RuleResult<Rule> {
        let index = self.custom_index(name)?;
        let mut custom = self.custom.clone();
        let removed = custom.remove(index);
        self.commit(custom)?;
        Ok(removed)
    }

    /// Replaces the extensions and pattern of a custom rule and saves.
    ///
    /// # Errors
    ///
    /// `NotFound` if `name` is not a custom rule, `InvalidPattern` for a bad
    /// pattern, `Io` if saving fails.
    pub fn edit(&mut self, name: &str, extensions: Vec<String>, pattern: &str) -> RuleResult<()> {
        let index = self.custom_index(name)?;
        validate_pattern(pattern)?;

        let mut custom = self.custom.clone();
        custom[index].extensions = extensions;
        custom[index].pattern = pattern.to_string();
        self.commit(custom)
    }

    fn custom_index(&self, name: &str) -> RuleResult<usize> {
        self.custom
            .iter()
            .position(|rule| rule.name == name)
            .ok_or_else(|| RuleError::NotFound {
                name: name.to_string(),
            })
    }

    /// Builds the active rule set for the given names.
    ///
    /// Every custom rule takes part, selected or not; `names` decides which
    /// built-in rules join them and whether anything was selected at all.
    ///
    /// # Errors
    ///
    /// `NotFound` for a name that is neither built-in nor custom.
    pub fn activate<S: AsRef<str>>(
        &self,
        names: &[S],
        priority: &[String],
    ) -> RuleResult<ActiveRules> {
        let rules = names
            .iter()
            .map(|name| {
                self.get(name.as_ref())
                    .cloned()
                    .ok_or_else(|| RuleError::NotFound {
                        name: name.as_ref().to_string(),
                    })
            })
            .collect::<RuleResult<Vec<_>>>()?;

        Ok(ActiveRules::with_standing(rules, self.custom.clone(), priority))
    }

    /// Builds an active rule set containing every known rule.
    pub fn activate_all(&self, priority: &[String]) -> ActiveRules {
        ActiveRules::new(self.rules().cloned().collect(), priority)
    }
}

fn validate_name(name: &str) -> RuleResult<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.contains('/') || name.contains('\\') {
        Some("name contains a path separator")
    } else if name == "." || name == ".." {
        Some("name is a relative path component")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(RuleError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn validate_pattern(pattern: &str) -> RuleResult<()> {
    NamePattern::compile(pattern)
        .map(|_| ())
        .map_err(|e| RuleError::InvalidPattern {
            pattern: e.pattern,
            reason: e.reason,
        })
}
