//! Marker line classification.
//!
//! A [`MarkerPatternSet`] holds the four compiled marker rules. Patterns are
//! anchored to column 0: a match that starts anywhere else does not count,
//! even if the configured expression omits the leading `^`.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Default "ours" marker: three or more `<` at line start.
pub const DEFAULT_OURS_PATTERN: &str = r"^<{3,}";
/// Default "theirs" marker: three or more `>` at line start.
pub const DEFAULT_THEIRS_PATTERN: &str = r"^>{3,}";
/// Default "ancestor" marker: three or more `|` at line start.
pub const DEFAULT_ANCESTOR_PATTERN: &str = r"^\|{3,}";
/// Default separator: a line made only of seven or more `=`.
pub const DEFAULT_SEPARATOR_PATTERN: &str = r"^={7,}$";

/// The kind of marker line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Ours,
    Theirs,
    Ancestor,
    Separator,
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ours => write!(f, "ours"),
            Self::Theirs => write!(f, "theirs"),
            Self::Ancestor => write!(f, "ancestor"),
            Self::Separator => write!(f, "separator"),
        }
    }
}

/// Compiled marker rules, read-only to the scanner and locator.
#[derive(Debug, Clone)]
pub struct MarkerPatternSet {
    ours: Regex,
    theirs: Regex,
    ancestor: Regex,
    separator: Regex,
}

impl MarkerPatternSet {
    /// Compile the four marker patterns.
    pub fn compile(
        ours: &str,
        theirs: &str,
        ancestor: &str,
        separator: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            ours: compile_one(MarkerKind::Ours, ours)?,
            theirs: compile_one(MarkerKind::Theirs, theirs)?,
            ancestor: compile_one(MarkerKind::Ancestor, ancestor)?,
            separator: compile_one(MarkerKind::Separator, separator)?,
        })
    }

    /// Classify a line.
    ///
    /// When more than one rule matches, the first of Ours, Ancestor,
    /// Separator, Theirs wins.
    pub fn classify(&self, line: &str) -> Option<MarkerKind> {
        if matches_at_start(&self.ours, line) {
            Some(MarkerKind::Ours)
        } else if matches_at_start(&self.ancestor, line) {
            Some(MarkerKind::Ancestor)
        } else if matches_at_start(&self.separator, line) {
            Some(MarkerKind::Separator)
        } else if matches_at_start(&self.theirs, line) {
            Some(MarkerKind::Theirs)
        } else {
            None
        }
    }

    /// `true` if the line is an "ours" marker.
    pub fn is_ours(&self, line: &str) -> bool {
        self.classify(line) == Some(MarkerKind::Ours)
    }

    /// `true` if the line is a "theirs" marker.
    pub fn is_theirs(&self, line: &str) -> bool {
        self.classify(line) == Some(MarkerKind::Theirs)
    }

    /// `true` if the line is an "ancestor" marker.
    pub fn is_ancestor(&self, line: &str) -> bool {
        self.classify(line) == Some(MarkerKind::Ancestor)
    }

    /// `true` if the line is a separator.
    pub fn is_separator(&self, line: &str) -> bool {
        self.classify(line) == Some(MarkerKind::Separator)
    }

    /// The source text of the pattern for `kind`.
    pub fn pattern(&self, kind: MarkerKind) -> &str {
        match kind {
            MarkerKind::Ours => self.ours.as_str(),
            MarkerKind::Theirs => self.theirs.as_str(),
            MarkerKind::Ancestor => self.ancestor.as_str(),
            MarkerKind::Separator => self.separator.as_str(),
        }
    }
}

impl Default for MarkerPatternSet {
    fn default() -> Self {
        // The built-in patterns are constants covered by tests.
        Self::compile(
            DEFAULT_OURS_PATTERN,
            DEFAULT_THEIRS_PATTERN,
            DEFAULT_ANCESTOR_PATTERN,
            DEFAULT_SEPARATOR_PATTERN,
        )
        .expect("built-in marker patterns must compile")
    }
}

fn compile_one(kind: MarkerKind, pattern: &str) -> Result<Regex, ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern {
            kind,
            pattern: String::new(),
            detail: "pattern must not be empty".into(),
        });
    }
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        kind,
        pattern: pattern.to_string(),
        detail: e.to_string(),
    })
}

/// The leftmost match starts at column 0 iff any match does.
fn matches_at_start(re: &Regex, line: &str) -> bool {
    re.find(line).is_some_and(|m| m.start() == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers() {
        let p = MarkerPatternSet::default();
        assert_eq!(p.classify("<<<<<<< HEAD"), Some(MarkerKind::Ours));
        assert_eq!(p.classify("<<<"), Some(MarkerKind::Ours));
        assert_eq!(p.classify(">>>>>>> feature"), Some(MarkerKind::Theirs));
        assert_eq!(p.classify("||||||| merged common ancestors"), Some(MarkerKind::Ancestor));
        assert_eq!(p.classify("======="), Some(MarkerKind::Separator));
        assert_eq!(p.classify("=========="), Some(MarkerKind::Separator));
    }

    #[test]
    fn test_non_markers() {
        let p = MarkerPatternSet::default();
        assert_eq!(p.classify("plain text"), None);
        assert_eq!(p.classify(""), None);
        assert_eq!(p.classify("<< shift"), None);
        assert_eq!(p.classify(" <<<<<<< indented"), None);
        assert_eq!(p.classify("====== six"), None);
        assert_eq!(p.classify("======= trailing"), None);
        assert_eq!(p.classify("x = a || b"), None);
    }

    #[test]
    fn test_unanchored_pattern_still_anchored() {
        let p = MarkerPatternSet::compile("<<<", ">>>", r"\|\|\|", "===").unwrap();
        assert_eq!(p.classify("a <<< b"), None);
        assert_eq!(p.classify("<<< b"), Some(MarkerKind::Ours));
    }

    #[test]
    fn test_classification_order() {
        // Every rule matches "###"; Ours must win.
        let p = MarkerPatternSet::compile("#", "#", "#", "#").unwrap();
        assert_eq!(p.classify("###"), Some(MarkerKind::Ours));

        // Ancestor beats Separator and Theirs.
        let p = MarkerPatternSet::compile("^<", "^#", "^#", "^#").unwrap();
        assert_eq!(p.classify("#"), Some(MarkerKind::Ancestor));

        // Separator beats Theirs.
        let p = MarkerPatternSet::compile("^<", "^#", r"^\|", "^#").unwrap();
        assert_eq!(p.classify("#"), Some(MarkerKind::Separator));
    }

    #[test]
    fn test_predicates() {
        let p = MarkerPatternSet::default();
        assert!(p.is_ours("<<<<<<< a"));
        assert!(p.is_theirs(">>>>>>> b"));
        assert!(p.is_ancestor("|||||||"));
        assert!(p.is_separator("======="));
        assert!(!p.is_theirs("<<<<<<< a"));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = MarkerPatternSet::compile("(", ">", "|", "=");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPattern { kind: MarkerKind::Ours, .. })
        ));

        let result = MarkerPatternSet::compile("<", ">", "|", "");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPattern { kind: MarkerKind::Separator, .. })
        ));
    }

    #[test]
    fn test_pattern_source() {
        let p = MarkerPatternSet::default();
        assert_eq!(p.pattern(MarkerKind::Separator), DEFAULT_SEPARATOR_PATTERN);
    }
}
