//! TOML-based configuration for conflictmark.
//!
//! Every section is optional; an empty file yields the built-in defaults,
//! which reproduce the standard Git marker grammar. The configuration is
//! read once by the host and handed to core calls as explicit values
//! ([`MarkerPatternSet`], [`DiffLabels`]).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::conflict::DiffLabels;
use crate::errors::ConfigError;
use crate::markers::{
    MarkerPatternSet, DEFAULT_ANCESTOR_PATTERN, DEFAULT_OURS_PATTERN, DEFAULT_SEPARATOR_PATTERN,
    DEFAULT_THEIRS_PATTERN,
};

/// Environment variable overriding `[log] level`.
pub const LOG_LEVEL_ENV: &str = "CONFLICTMARK_LOG_LEVEL";
/// When set (to anything), disables colored diff output.
pub const NO_COLOR_ENV: &str = "NO_COLOR";

const MAX_CONTEXT_LINES: usize = 1000;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Marker line patterns.
    #[serde(default)]
    pub markers: MarkerConfig,

    /// Section display names used in diff labels.
    #[serde(default)]
    pub labels: DiffLabels,

    /// Diff rendering settings.
    #[serde(default)]
    pub diff: DiffConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

/// Marker patterns as `regex-lite` expressions, matched at column 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkerConfig {
    #[serde(default = "default_ours")]
    pub ours: String,
    #[serde(default = "default_theirs")]
    pub theirs: String,
    #[serde(default = "default_ancestor")]
    pub ancestor: String,
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_ours() -> String {
    DEFAULT_OURS_PATTERN.into()
}
fn default_theirs() -> String {
    DEFAULT_THEIRS_PATTERN.into()
}
fn default_ancestor() -> String {
    DEFAULT_ANCESTOR_PATTERN.into()
}
fn default_separator() -> String {
    DEFAULT_SEPARATOR_PATTERN.into()
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            ours: default_ours(),
            theirs: default_theirs(),
            ancestor: default_ancestor(),
            separator: default_separator(),
        }
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Diff rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffConfig {
    /// Unchanged lines shown around each hunk (default 3).
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,

    /// Color diff output on terminals (default true).
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_context_lines() -> usize {
    3
}
fn default_true() -> bool {
    true
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
            color: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum tracing level or filter directive (default `warn`).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load an [`AppConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply environment overrides ([`LOG_LEVEL_ENV`], [`NO_COLOR_ENV`]).
    pub fn resolve_env_overrides(&mut self) {
        if let Some(level) = resolve_optional_env(LOG_LEVEL_ENV, "log.level") {
            self.log.level = level;
        }
        if std::env::var_os(NO_COLOR_ENV).is_some() {
            debug!(env_name = NO_COLOR_ENV, "color disabled by environment");
            self.diff.color = false;
        }
    }

    /// Validate that all values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.marker_patterns()?;

        for (field, value) in [
            ("labels.ours", &self.labels.ours),
            ("labels.theirs", &self.labels.theirs),
            ("labels.base", &self.labels.base),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    detail: "label must not be empty".into(),
                });
            }
        }

        if self.diff.context_lines > MAX_CONTEXT_LINES {
            return Err(ConfigError::InvalidValue {
                field: "diff.context_lines".into(),
                detail: format!("must be at most {}", MAX_CONTEXT_LINES),
            });
        }

        if self.log.level.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log.level".into(),
                detail: "log level must not be empty".into(),
            });
        }

        Ok(())
    }

    /// Convenience: load, apply env overrides, and validate in one call.
    pub fn load_and_validate<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.resolve_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Compile the configured marker patterns.
    pub fn marker_patterns(&self) -> Result<MarkerPatternSet, ConfigError> {
        MarkerPatternSet::compile(
            &self.markers.ours,
            &self.markers.theirs,
            &self.markers.ancestor,
            &self.markers.separator,
        )
    }

    /// Section labels for diff planning.
    pub fn diff_labels(&self) -> DiffLabels {
        self.labels.clone()
    }
}

/// Read an environment variable by name. Returns `Some(value)` when set and
/// non-empty; logs and returns `None` otherwise.
fn resolve_optional_env(env_name: &str, field: &str) -> Option<String> {
    match std::env::var(env_name) {
        Ok(val) if !val.is_empty() => {
            debug!(field, env_name, "resolved env override");
            Some(val)
        }
        Ok(_) => {
            warn!(field, env_name, "env var is set but empty");
            None
        }
        Err(_) => None,
    }
}
