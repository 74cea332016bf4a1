//! Error types for the conflictmark core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them for callers that want a single
//! error type.

use thiserror::Error;

use crate::markers::MarkerKind;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Conflict errors
// ---------------------------------------------------------------------------

/// Errors from locating, resolving, and diffing conflict blocks.
///
/// Malformed marker sequences are never an error: the scanner and locator
/// report them as "no block found".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConflictError {
    /// The cursor is not inside a well-formed conflict block.
    #[error("line {line} is not inside a conflict")]
    NotInConflict { line: usize },

    /// A base-relative operation was requested on a block without an
    /// ancestor section.
    #[error("the conflict starting at line {start} has no base version")]
    NoBaseAvailable { start: usize },

    /// The block ends past the line sequence it is being applied to; the
    /// buffer was mutated after the scan.
    #[error("conflict block ending at line {end} is stale (buffer has {line_count} lines)")]
    StaleBlock { end: usize, line_count: usize },

    /// A resolution strategy name could not be parsed.
    #[error("unknown resolution strategy '{0}': use ours, theirs, both, both-reversed, base or none")]
    UnknownStrategy(String),

    /// A diff pair name could not be parsed.
    #[error("unknown diff pair '{0}': use base-ours, base-theirs, ours-theirs or theirs-ours")]
    UnknownDiffPair(String),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// A marker pattern is not a valid regular expression.
    #[error("invalid {kind} marker pattern '{pattern}': {detail}")]
    InvalidPattern {
        kind: MarkerKind,
        pattern: String,
        detail: String,
    },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
