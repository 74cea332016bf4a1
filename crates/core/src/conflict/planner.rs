//! Diff pair planning.
//!
//! Decides which sections of a conflict to compare, in what order, and how to
//! label each comparison. The planner never runs a diff program itself; each
//! [`DiffJob`] can be rendered as a unified diff with `diffy` by the host.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::block::{ConflictBlock, Section};
use super::locator::locate;
use crate::errors::ConflictError;
use crate::markers::MarkerPatternSet;

// ---------------------------------------------------------------------------
// Pairs and labels
// ---------------------------------------------------------------------------

/// A comparison between two sections. Variant order is emission order.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "kebab-case")]
pub enum DiffPair {
    BaseOurs,
    BaseTheirs,
    OursTheirs,
    TheirsOurs,
}

impl DiffPair {
    pub const ALL: [DiffPair; 4] = [
        DiffPair::BaseOurs,
        DiffPair::BaseTheirs,
        DiffPair::OursTheirs,
        DiffPair::TheirsOurs,
    ];

    /// (left, right) sections.
    pub fn sections(&self) -> (Section, Section) {
        match self {
            Self::BaseOurs => (Section::Ancestor, Section::Ours),
            Self::BaseTheirs => (Section::Ancestor, Section::Theirs),
            Self::OursTheirs => (Section::Ours, Section::Theirs),
            Self::TheirsOurs => (Section::Theirs, Section::Ours),
        }
    }

    pub fn needs_base(&self) -> bool {
        matches!(self, Self::BaseOurs | Self::BaseTheirs)
    }
}

impl std::fmt::Display for DiffPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BaseOurs => write!(f, "base-ours"),
            Self::BaseTheirs => write!(f, "base-theirs"),
            Self::OursTheirs => write!(f, "ours-theirs"),
            Self::TheirsOurs => write!(f, "theirs-ours"),
        }
    }
}

impl FromStr for DiffPair {
    type Err = ConflictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "base-ours" => Ok(Self::BaseOurs),
            "base-theirs" => Ok(Self::BaseTheirs),
            "ours-theirs" => Ok(Self::OursTheirs),
            "theirs-ours" => Ok(Self::TheirsOurs),
            _ => Err(ConflictError::UnknownDiffPair(s.to_string())),
        }
    }
}

/// Display names for the three sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffLabels {
    #[serde(default = "default_ours_label")]
    pub ours: String,
    #[serde(default = "default_theirs_label")]
    pub theirs: String,
    #[serde(default = "default_base_label")]
    pub base: String,
}

fn default_ours_label() -> String {
    "Ours".into()
}
fn default_theirs_label() -> String {
    "Theirs".into()
}
fn default_base_label() -> String {
    "Base".into()
}

impl Default for DiffLabels {
    fn default() -> Self {
        Self {
            ours: default_ours_label(),
            theirs: default_theirs_label(),
            base: default_base_label(),
        }
    }
}

impl DiffLabels {
    pub fn for_section(&self, section: Section) -> &str {
        match section {
            Section::Ours => &self.ours,
            Section::Theirs => &self.theirs,
            Section::Ancestor => &self.base,
        }
    }
}

// ---------------------------------------------------------------------------
// Jobs and plans
// ---------------------------------------------------------------------------

/// One labeled comparison, ready to hand to a diff renderer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DiffJob {
    pub pair: DiffPair,
    /// `"<left> → <right>"`.
    pub label: String,
    pub left_label: String,
    pub right_label: String,
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl DiffJob {
    /// `true` if both sides have identical content.
    pub fn is_identical(&self) -> bool {
        self.left == self.right
    }

    /// Render a unified diff of left against right.
    ///
    /// Returns an empty string when the two sides are identical.
    pub fn unified_diff(&self, context_lines: usize) -> String {
        if self.is_identical() {
            return String::new();
        }

        let left = join_lines(&self.left);
        let right = join_lines(&self.right);
        let mut options = diffy::DiffOptions::new();
        options.set_context_len(context_lines);
        let patch = options.create_patch(&left, &right).to_string();

        // Replace diffy's placeholder file names with the section labels.
        let body: Vec<&str> = patch
            .lines()
            .skip_while(|l| l.starts_with("--- ") || l.starts_with("+++ "))
            .collect();

        let mut out = format!("--- {}\n+++ {}\n", self.left_label, self.right_label);
        for line in body {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

fn join_lines(lines: &[String]) -> String {
    let mut s = String::new();
    for l in lines {
        s.push_str(l);
        s.push('\n');
    }
    s
}

/// The ordered jobs plus the presentation hint for the renderer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DiffPlan {
    pub jobs: Vec<DiffJob>,
    /// More than one pair was requested; each job should be preceded by a
    /// label header.
    pub multiple: bool,
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Stateless diff planning operations.
pub struct DiffPlanner;

impl DiffPlanner {
    /// Build the comparison jobs for `block`.
    ///
    /// Duplicate requests collapse; jobs come out in [`DiffPair::ALL`] order.
    /// Fails as a whole with `NoBaseAvailable` if any base-relative pair is
    /// requested on a block without an ancestor section.
    pub fn plan<S: AsRef<str>>(
        lines: &[S],
        block: &ConflictBlock,
        requested: &[DiffPair],
        labels: &DiffLabels,
    ) -> Result<DiffPlan, ConflictError> {
        if !block.fits(lines.len()) {
            return Err(ConflictError::StaleBlock {
                end: block.end(),
                line_count: lines.len(),
            });
        }

        let pairs: Vec<DiffPair> = DiffPair::ALL
            .into_iter()
            .filter(|p| requested.contains(p))
            .collect();

        if !block.has_base() && pairs.iter().any(DiffPair::needs_base) {
            debug!(start = block.start(), "base-relative diff on a two-way block");
            return Err(ConflictError::NoBaseAvailable {
                start: block.start(),
            });
        }

        let mut jobs = Vec::with_capacity(pairs.len());
        for pair in &pairs {
            let (left_section, right_section) = pair.sections();
            let missing = || ConflictError::NoBaseAvailable {
                start: block.start(),
            };
            let left = block.section(lines, left_section).ok_or_else(missing)?;
            let right = block.section(lines, right_section).ok_or_else(missing)?;
            let left_label = labels.for_section(left_section).to_string();
            let right_label = labels.for_section(right_section).to_string();

            jobs.push(DiffJob {
                pair: *pair,
                label: format!("{} → {}", left_label, right_label),
                left_label,
                right_label,
                left,
                right,
            });
        }

        let multiple = jobs.len() > 1;
        info!(
            start = block.start(),
            jobs = jobs.len(),
            multiple,
            "diff plan built"
        );
        Ok(DiffPlan { jobs, multiple })
    }

    /// Locate the block under the cursor and plan its diffs.
    pub fn plan_at_cursor<S: AsRef<str>>(
        lines: &[S],
        cursor_line: usize,
        patterns: &MarkerPatternSet,
        requested: &[DiffPair],
        labels: &DiffLabels,
    ) -> Result<DiffPlan, ConflictError> {
        let block = locate(lines, cursor_line, patterns)
            .ok_or(ConflictError::NotInConflict { line: cursor_line })?;
        Self::plan(lines, &block, requested, labels)
    }
}
