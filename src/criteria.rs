//! Classification rules and the rule-evaluation contract.
//!
//! A [`Rule`] pairs a set of file-name suffixes with a file-name pattern. Built-in
//! rules ship with the binary; custom rules are managed by
//! [`RuleStore`](crate::rule_store::RuleStore).
//!
//! Built-in and custom rules are evaluated with different semantics:
//!
//! * a **built-in** rule matches when its pattern matches the file name **and** the
//!   name ends with one of its extensions;
//! * a **custom** rule matches when the name ends with one of its extensions **or**
//!   its pattern matches.
//!
//! Custom rules are checked after built-in rules and the first matching custom rule
//! overrides whatever built-in rule was chosen.
//!
//! # Examples
//!
//! ```
//! use archistack::criteria::{ActiveRules, Rule, RuleOrigin};
//!
//! let audio = Rule::new("Audio", [".mp3"], "audio*", RuleOrigin::BuiltIn);
//! let active = ActiveRules::new(vec![audio], &[]);
//!
//! assert_eq!(active.categorize("audio_track.mp3"), Some("Audio"));
//! assert_eq!(active.categorize("song.mp3"), None);
//! assert_eq!(active.group_for("song.mp3"), "song");
//! ```
use glob::Pattern;
use regex::Regex;
use std::path::Path;

/// Where a rule comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleOrigin {
    /// Compiled into the binary, not removable.
    BuiltIn,
    /// Defined by the user and persisted in the rules file.
    Custom,
}

/// A named classification criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Unique rule name, also used as the destination folder name.
    pub name: String,
    /// File-name suffixes as written by the user (e.g. `".mp3"` or `"*.mp3"`).
    pub extensions: Vec<String>,
    /// Glob (contains `*` or `?`) or regular expression matched at the start of the
    /// name. An empty pattern matches every name.
    pub pattern: String,
    /// Built-in or custom.
    pub origin: RuleOrigin,
}

impl Rule {
    /// Creates a rule from its parts.
    pub fn new<I, S>(name: &str, extensions: I, pattern: &str, origin: RuleOrigin) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            extensions: extensions.into_iter().map(Into::into).collect(),
            pattern: pattern.to_string(),
            origin,
        }
    }

    /// Returns the extensions lowercased with a single leading dot, deduplicated.
    ///
    /// ```
    /// use archistack::criteria::{Rule, RuleOrigin};
    ///
    /// let rule = Rule::new("Audio", ["*.MP3", "wav", ".mp3", ""], "", RuleOrigin::Custom);
    /// assert_eq!(rule.normalized_extensions(), vec![".mp3", ".wav"]);
    /// ```
    pub fn normalized_extensions(&self) -> Vec<String> {
        let mut normalized: Vec<String> = Vec::new();
        for ext in &self.extensions {
            if let Some(ext) = normalize_extension(ext)
                && !normalized.contains(&ext)
            {
                normalized.push(ext);
            }
        }
        normalized
    }

    /// Returns true for built-in rules.
    pub fn is_built_in(&self) -> bool {
        self.origin == RuleOrigin::BuiltIn
    }

    /// Human-readable summary of what the rule sorts.
    ///
    /// Built-in rules use the text from the built-in table; custom rules list
    /// their extensions and pattern.
    ///
    /// ```
    /// use archistack::criteria::{Rule, RuleOrigin};
    ///
    /// let rule = Rule::new("Logs", [".log", ".txt"], "*log*", RuleOrigin::Custom);
    /// assert_eq!(
    ///     rule.description(),
    ///     "Custom rule with extensions .log, .txt and pattern *log*"
    /// );
    /// ```
    pub fn description(&self) -> String {
        if self.is_built_in()
            && let Some((_, _, _, text)) = BUILT_IN_TABLE
                .iter()
                .find(|(name, ..)| *name == self.name)
        {
            return (*text).to_string();
        }

        let extensions = if self.extensions.is_empty() {
            "(none)".to_string()
        } else {
            self.extensions.join(", ")
        };
        let pattern = if self.pattern.is_empty() {
            "(any name)"
        } else {
            self.pattern.as_str()
        };
        format!("Custom rule with extensions {} and pattern {}", extensions, pattern)
    }
}

/// Normalizes a user-supplied extension: `"*.MP3"`, `"MP3"` and `".mp3"` all become `".mp3"`.
pub fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim().trim_start_matches('*').trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

/// Built-in rule table: name, extensions, pattern, description.
const BUILT_IN_TABLE: &[(&str, &[&str], &str, &str)] = &[
    (
        "Audio",
        &[".mp3", ".wav", ".ogg", ".flac", ".m4a", ".aac", ".wma"],
        "audio*",
        "Audio files whose name starts with \"audio\"",
    ),
    (
        "Images",
        &[".jpg", ".jpeg", ".png", ".bmp", ".tiff", ".gif", ".webp", ".ico"],
        "image*",
        "Images whose name starts with \"image\"",
    ),
    (
        "Documents",
        &[
            ".pdf", ".txt", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".ods",
            ".odp", ".rtf", ".csv",
        ],
        "doc*",
        "Documents and spreadsheets whose name starts with \"doc\"",
    ),
    (
        "Videos",
        &[".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".m4v", ".h264"],
        "video*",
        "Videos whose name starts with \"video\"",
    ),
    (
        "Compressed",
        &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz", ".iso"],
        "compressed*",
        "Compressed archives whose name starts with \"compressed\"",
    ),
    (
        "Code",
        &[
            ".py", ".js", ".html", ".css", ".php", ".java", ".cpp", ".c", ".cs", ".sh", ".bat",
            ".swift", ".go", ".rb",
        ],
        "code*",
        "Source code and scripts whose name starts with \"code\"",
    ),
    (
        "Database",
        &[".db", ".sql", ".sqlite", ".sqlite3", ".mdb", ".accdb"],
        "database*",
        "Database files whose name starts with \"database\"",
    ),
    (
        "Fonts",
        &[".ttf", ".otf", ".woff", ".woff2", ".eot", ".fon"],
        "font*",
        "Font files whose name starts with \"font\"",
    ),
    (
        "Executable",
        &[".exe", ".app", ".bin", ".msi", ".dmg", ".apk", ".ipa"],
        "executable*",
        "Programs and installers whose name starts with \"executable\"",
    ),
    (
        "Sims 4 Mods",
        &[
            ".ts4script",
            ".package",
            ".trayitem",
            ".blueprint",
            ".room",
            ".householdbinary",
            ".bpi",
        ],
        "sims4mod*",
        "Sims 4 mod and tray files whose name starts with \"sims4mod\"",
    ),
    (
        "Custom Content",
        &[".package"],
        "cc_*",
        "Custom content packages named cc_*",
    ),
    (
        "Script Mods",
        &[".ts4script"],
        "scriptmod_*",
        "Script mods named scriptmod_*",
    ),
    (
        "Build Mode Objects",
        &[".package"],
        "buildmode_*",
        "Build mode packages named buildmode_*",
    ),
];

/// Returns the built-in rules in their canonical order.
pub fn built_in_rules() -> Vec<Rule> {
    BUILT_IN_TABLE
        .iter()
        .map(|(name, extensions, pattern, _)| {
            Rule::new(name, extensions.iter().copied(), pattern, RuleOrigin::BuiltIn)
        })
        .collect()
}

/// Priority list used when the configuration does not provide one.
pub const DEFAULT_PRIORITY: &[&str] = &["Mods", "Tray", "Archives"];

/// A pattern that could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    /// The offending pattern.
    pub pattern: String,
    /// Why it was rejected.
    pub reason: String,
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid pattern '{}': {}", self.pattern, self.reason)
    }
}

impl std::error::Error for PatternError {}

/// A compiled file-name pattern.
#[derive(Debug, Clone)]
pub enum NamePattern {
    /// Wildcard pattern matched against the whole file name.
    Glob(Pattern),
    /// Regular expression anchored at the start of the file name.
    Regex(Regex),
    /// Matches nothing; stands in for a pattern that failed to compile.
    Never,
}

impl NamePattern {
    /// Compiles a pattern. Patterns containing `*` or `?` are globs, anything else
    /// is a regular expression matched from the first character, so the empty
    /// pattern matches every name.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if is_wildcard(pattern) {
            Pattern::new(pattern)
                .map(NamePattern::Glob)
                .map_err(|e| PatternError {
                    pattern: pattern.to_string(),
                    reason: e.msg.to_string(),
                })
        } else {
            Regex::new(&format!("^(?:{})", pattern))
                .map(NamePattern::Regex)
                .map_err(|e| PatternError {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })
        }
    }

    /// Compiles a pattern, turning invalid ones into [`NamePattern::Never`].
    pub fn compile_lossy(pattern: &str) -> Self {
        Self::compile(pattern).unwrap_or(NamePattern::Never)
    }

    /// Checks a bare file name against the pattern.
    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            NamePattern::Glob(pattern) => pattern.matches(file_name),
            NamePattern::Regex(regex) => regex.is_match(file_name),
            NamePattern::Never => false,
        }
    }
}

fn is_wildcard(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// A rule with its pattern and extensions prepared for matching.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: Rule,
    extensions: Vec<String>,
    pattern: NamePattern,
}

impl CompiledRule {
    /// Prepares a rule for matching. Unusable patterns never match.
    pub fn new(rule: Rule) -> Self {
        Self {
            extensions: rule.normalized_extensions(),
            pattern: NamePattern::compile_lossy(&rule.pattern),
            rule,
        }
    }

    /// The underlying rule.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// The rule name.
    pub fn name(&self) -> &str {
        &self.rule.name
    }

    fn has_extension(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }

    /// Applies the rule with the semantics of its origin (AND for built-in, OR for custom).
    pub fn matches(&self, file_name: &str) -> bool {
        match self.rule.origin {
            RuleOrigin::BuiltIn => {
                self.pattern.matches(file_name) && self.has_extension(file_name)
            }
            RuleOrigin::Custom => {
                self.has_extension(file_name) || self.pattern.matches(file_name)
            }
        }
    }
}

/// The rules selected for one sort, in evaluation order.
#[derive(Debug, Clone, Default)]
pub struct ActiveRules {
    built_in: Vec<CompiledRule>,
    custom: Vec<CompiledRule>,
    has_selection: bool,
}

impl ActiveRules {
    /// Orders the supplied rules for evaluation.
    ///
    /// Within each origin, rules named in `priority` come first (in priority order),
    /// followed by the remaining rules in the order supplied. A rule name supplied
    /// more than once is kept only the first time.
    pub fn new(rules: Vec<Rule>, priority: &[String]) -> Self {
        let mut seen: Vec<String> = Vec::new();
        let mut built_in = Vec::new();
        let mut custom = Vec::new();

        for rule in rules {
            if seen.contains(&rule.name) {
                continue;
            }
            seen.push(rule.name.clone());
            match rule.origin {
                RuleOrigin::BuiltIn => built_in.push(rule),
                RuleOrigin::Custom => custom.push(rule),
            }
        }

        Self {
            has_selection: !seen.is_empty(),
            built_in: order_by_priority(built_in, priority),
            custom: order_by_priority(custom, priority),
        }
    }

    /// Like [`ActiveRules::new`], with `standing` custom rules that take part in
    /// every sort whether or not they were selected.
    ///
    /// Only `selected` counts towards [`ActiveRules::has_selection`]. Standing
    /// rules are evaluated in their own order, ahead of selected custom rules
    /// they do not already contain.
    ///
    /// ```
    /// use archistack::criteria::{ActiveRules, Rule, RuleOrigin};
    ///
    /// let audio = Rule::new("Audio", [".mp3"], "audio*", RuleOrigin::BuiltIn);
    /// let mine = Rule::new("MyAudio", [".mp3"], "*", RuleOrigin::Custom);
    ///
    /// let active = ActiveRules::with_standing(vec![audio], vec![mine.clone()], &[]);
    /// assert_eq!(active.categorize("song.mp3"), Some("MyAudio"));
    ///
    /// let nothing_picked = ActiveRules::with_standing(Vec::new(), vec![mine], &[]);
    /// assert!(!nothing_picked.has_selection());
    /// ```
    pub fn with_standing(selected: Vec<Rule>, standing: Vec<Rule>, priority: &[String]) -> Self {
        let has_selection = !selected.is_empty();
        let (built_in, custom): (Vec<Rule>, Vec<Rule>) =
            selected.into_iter().partition(Rule::is_built_in);
        let rules = built_in.into_iter().chain(standing).chain(custom).collect();

        Self {
            has_selection,
            ..Self::new(rules, priority)
        }
    }

    /// Returns true when the caller picked at least one rule.
    pub fn has_selection(&self) -> bool {
        self.has_selection
    }

    /// Returns true when no rule is active.
    pub fn is_empty(&self) -> bool {
        self.built_in.is_empty() && self.custom.is_empty()
    }

    /// Number of active rules.
    pub fn len(&self) -> usize {
        self.built_in.len() + self.custom.len()
    }

    /// Rule names in evaluation order.
    pub fn names(&self) -> Vec<&str> {
        self.built_in
            .iter()
            .chain(self.custom.iter())
            .map(CompiledRule::name)
            .collect()
    }

    /// Returns the name of the rule that claims `file_name`, if any.
    ///
    /// The first matching built-in rule is the provisional answer; the first
    /// matching custom rule replaces it.
    pub fn categorize(&self, file_name: &str) -> Option<&str> {
        let custom = self.custom.iter().find(|rule| rule.matches(file_name));
        if let Some(rule) = custom {
            return Some(rule.name());
        }

        self.built_in
            .iter()
            .find(|rule| rule.matches(file_name))
            .map(CompiledRule::name)
    }

    /// Returns the destination group for `file_name`: the matching rule name, or
    /// the file's own base name when nothing matches.
    pub fn group_for(&self, file_name: &str) -> String {
        match self.categorize(file_name) {
            Some(name) => name.to_string(),
            None => own_name_group(file_name),
        }
    }
}

fn order_by_priority(rules: Vec<Rule>, priority: &[String]) -> Vec<CompiledRule> {
    let mut remaining = rules;
    let mut ordered = Vec::with_capacity(remaining.len());

    for name in priority {
        if let Some(index) = remaining.iter().position(|rule| &rule.name == name) {
            ordered.push(remaining.remove(index));
        }
    }
    ordered.extend(remaining);

    ordered.into_iter().map(CompiledRule::new).collect()
}

/// Group name for a file no rule claims: its name without the last extension.
pub fn own_name_group(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built_in(name: &str, extensions: &[&str], pattern: &str) -> Rule {
        Rule::new(name, extensions.iter().copied(), pattern, RuleOrigin::BuiltIn)
    }

    fn custom(name: &str, extensions: &[&str], pattern: &str) -> Rule {
        Rule::new(name, extensions.iter().copied(), pattern, RuleOrigin::Custom)
    }

    #[test]
    fn test_built_in_table_names_are_unique() {
        let rules = built_in_rules();
        let mut names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), rules.len());
        assert!(rules.iter().all(Rule::is_built_in));
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("*.MP3"), Some(".mp3".to_string()));
        assert_eq!(normalize_extension("wav"), Some(".wav".to_string()));
        assert_eq!(normalize_extension(" .tar.gz "), Some(".tar.gz".to_string()));
        assert_eq!(normalize_extension("*"), None);
        assert_eq!(normalize_extension(""), None);
    }

    #[test]
    fn test_glob_pattern() {
        let pattern = NamePattern::compile("audio*").unwrap();
        assert!(pattern.matches("audio_01.mp3"));
        assert!(!pattern.matches("song.mp3"));
    }

    #[test]
    fn test_regex_pattern_is_anchored_at_start() {
        let pattern = NamePattern::compile(r"mod_\d+").unwrap();
        assert!(pattern.matches("mod_12.package"));
        assert!(!pattern.matches("my_mod_12.package"));
    }

    #[test]
    fn test_empty_pattern_matches_every_name() {
        let pattern = NamePattern::compile("").unwrap();
        assert!(pattern.matches("anything.bin"));
        assert!(pattern.matches(".hidden"));
    }

    #[test]
    fn test_custom_rule_with_empty_pattern_claims_every_file() {
        let active = ActiveRules::new(
            vec![
                built_in("Audio", &[".mp3"], "audio*"),
                custom("Inbox", &[".log"], ""),
            ],
            &[],
        );
        assert_eq!(active.categorize("audio_intro.mp3"), Some("Inbox"));
        assert_eq!(active.categorize("notes.txt"), Some("Inbox"));
    }

    #[test]
    fn test_brackets_are_regex_not_glob() {
        let pattern = NamePattern::compile("[ab]_").unwrap();
        assert!(matches!(pattern, NamePattern::Regex(_)));
        assert!(pattern.matches("a_file.txt"));
        assert!(!pattern.matches("c_file.txt"));
    }

    #[test]
    fn test_rule_descriptions() {
        let audio = built_in_rules()
            .into_iter()
            .find(|rule| rule.name == "Audio")
            .unwrap();
        assert_eq!(audio.description(), "Audio files whose name starts with \"audio\"");
        assert!(built_in_rules().iter().all(|rule| !rule.description().is_empty()));

        let inbox = custom("Inbox", &[], "");
        assert_eq!(
            inbox.description(),
            "Custom rule with extensions (none) and pattern (any name)"
        );
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let err = NamePattern::compile("(unclosed").unwrap_err();
        assert_eq!(err.pattern, "(unclosed");
        assert!(matches!(
            NamePattern::compile_lossy("(unclosed"),
            NamePattern::Never
        ));
    }

    #[test]
    fn test_built_in_requires_pattern_and_extension() {
        let active = ActiveRules::new(vec![built_in("Audio", &[".mp3"], "audio*")], &[]);

        assert_eq!(active.categorize("audio_intro.mp3"), Some("Audio"));
        assert_eq!(active.categorize("AUDIO_intro.MP3"), None);
        assert_eq!(active.categorize("audio_intro.wav"), None);
        assert_eq!(active.categorize("song.mp3"), None);
        assert_eq!(active.group_for("song.mp3"), "song");
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let active = ActiveRules::new(vec![built_in("Audio", &["*.mp3"], "audio*")], &[]);
        assert_eq!(active.categorize("audio_intro.MP3"), Some("Audio"));
    }

    #[test]
    fn test_custom_rule_uses_either_condition() {
        let active = ActiveRules::new(
            vec![custom("Logs", &[".log"], "*log*"), custom("Music", &[".mp3"], "*")],
            &[],
        );

        assert_eq!(active.categorize("server.log"), Some("Logs"));
        assert_eq!(active.categorize("changelog.txt"), Some("Logs"));
        assert_eq!(active.categorize("song.mp3"), Some("Music"));
    }

    #[test]
    fn test_custom_rule_overrides_built_in() {
        let active = ActiveRules::new(
            vec![
                built_in("Audio", &[".mp3"], "audio*"),
                custom("Podcasts", &[".mp3"], ""),
            ],
            &[],
        );
        assert_eq!(active.categorize("audio_episode.mp3"), Some("Podcasts"));
    }

    #[test]
    fn test_priority_list_orders_built_in_rules() {
        let rules = vec![
            built_in("Compressed", &[".zip"], "*"),
            built_in("Archives", &[".zip"], "*"),
        ];

        let unordered = ActiveRules::new(rules.clone(), &[]);
        assert_eq!(unordered.categorize("pack.zip"), Some("Compressed"));

        let ordered = ActiveRules::new(rules, &["Archives".to_string()]);
        assert_eq!(ordered.names(), vec!["Archives", "Compressed"]);
        assert_eq!(ordered.categorize("pack.zip"), Some("Archives"));
    }

    #[test]
    fn test_standing_custom_rules_apply_without_selection() {
        let active = ActiveRules::with_standing(
            vec![built_in("Audio", &[".mp3"], "audio*")],
            vec![custom("MyAudio", &[".mp3"], "*")],
            &[],
        );

        assert!(active.has_selection());
        assert_eq!(active.names(), vec!["Audio", "MyAudio"]);
        assert_eq!(active.group_for("song.mp3"), "MyAudio");
    }

    #[test]
    fn test_standing_rules_alone_are_not_a_selection() {
        let active =
            ActiveRules::with_standing(Vec::new(), vec![custom("Logs", &[".log"], "")], &[]);
        assert!(!active.is_empty());
        assert!(!active.has_selection());
        assert!(!ActiveRules::default().has_selection());
    }

    #[test]
    fn test_selected_custom_rule_keeps_store_order() {
        let first = custom("First", &[".a"], "x_*");
        let second = custom("Second", &[".a"], "y_*");
        let active = ActiveRules::with_standing(vec![second.clone()], vec![first, second], &[]);
        assert_eq!(active.names(), vec!["First", "Second"]);
        assert_eq!(active.categorize("z.a"), Some("First"));
    }

    #[test]
    fn test_duplicate_rules_are_kept_once() {
        let audio = built_in("Audio", &[".mp3"], "audio*");
        let active = ActiveRules::new(vec![audio.clone(), audio], &[]);
        assert_eq!(active.len(), 1);
    }

    #[test]
    fn test_categorize_is_deterministic() {
        let active = ActiveRules::new(built_in_rules(), &[]);
        let first: Vec<_> = ["image_1.png", "doc_a.pdf", "cc_hair.package", "x.bin"]
            .iter()
            .map(|name| active.group_for(name))
            .collect();
        let second: Vec<_> = ["image_1.png", "doc_a.pdf", "cc_hair.package", "x.bin"]
            .iter()
            .map(|name| active.group_for(name))
            .collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "Images");
        assert_eq!(first[1], "Documents");
        assert_eq!(first[2], "Custom Content");
        assert_eq!(first[3], "x");
    }

    #[test]
    fn test_own_name_group() {
        assert_eq!(own_name_group("song.mp3"), "song");
        assert_eq!(own_name_group("archive.tar.gz"), "archive.tar");
        assert_eq!(own_name_group("README"), "README");
        assert_eq!(own_name_group(".bashrc"), ".bashrc");
    }
}
