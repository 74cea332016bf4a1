//! Conflict resolution.
//!
//! The [`ConflictResolver`] turns a located block and a [`Strategy`] into a
//! replacement plan: the lines to write and the span they replace. It never
//! mutates the caller's buffer; [`Resolution::apply`] is provided for hosts
//! that hold the buffer as a plain `Vec<String>`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::block::{ConflictBlock, LineSpan, Section};
use super::locator::locate;
use super::scanner::scan;
use crate::errors::ConflictError;
use crate::markers::MarkerPatternSet;

/// Named resolution strategies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Keep the "ours" section.
    Ours,
    /// Keep the "theirs" section.
    Theirs,
    /// Keep ours, then theirs.
    Both,
    /// Keep theirs, then ours.
    BothReversed,
    /// Keep the ancestor section (diff3 blocks only).
    Base,
    /// Drop the whole block.
    None,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::Ours,
        Strategy::Theirs,
        Strategy::Both,
        Strategy::BothReversed,
        Strategy::Base,
        Strategy::None,
    ];

    /// `true` if the strategy reads the ancestor section.
    pub fn needs_base(&self) -> bool {
        matches!(self, Self::Base)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ours => write!(f, "ours"),
            Self::Theirs => write!(f, "theirs"),
            Self::Both => write!(f, "both"),
            Self::BothReversed => write!(f, "both-reversed"),
            Self::Base => write!(f, "base"),
            Self::None => write!(f, "none"),
        }
    }
}

impl FromStr for Strategy {
    type Err = ConflictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ours" => Ok(Self::Ours),
            "theirs" => Ok(Self::Theirs),
            "both" => Ok(Self::Both),
            "both-reversed" | "both_reversed" => Ok(Self::BothReversed),
            "base" => Ok(Self::Base),
            "none" => Ok(Self::None),
            other => Err(ConflictError::UnknownStrategy(other.to_string())),
        }
    }
}

/// A replacement plan for one conflict block.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Resolution {
    pub strategy: Strategy,
    /// The block being replaced, markers included.
    pub span: LineSpan,
    /// Lines to write in place of `span`.
    pub replacement: Vec<String>,
}

impl Resolution {
    /// Splice the replacement into `lines` and return the new buffer.
    pub fn apply<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<String>, ConflictError> {
        // Empty spans have `end == start - 1`.
        if self.span.start == 0
            || self.span.end > lines.len()
            || self.span.start > self.span.end + 1
        {
            return Err(ConflictError::StaleBlock {
                end: self.span.end,
                line_count: lines.len(),
            });
        }

        let mut out = Vec::with_capacity(lines.len() - self.span.len() + self.replacement.len());
        out.extend(lines[..self.span.start - 1].iter().map(|l| l.as_ref().to_string()));
        out.extend(self.replacement.iter().cloned());
        out.extend(lines[self.span.end..].iter().map(|l| l.as_ref().to_string()));
        Ok(out)
    }

    /// Net change in line count once applied.
    pub fn line_delta(&self) -> isize {
        self.replacement.len() as isize - self.span.len() as isize
    }
}

/// Stateless resolution operations.
pub struct ConflictResolver;

impl ConflictResolver {
    /// Compute the replacement for `block` under `strategy`.
    ///
    /// `lines` must be the sequence the block was scanned from.
    pub fn resolve<S: AsRef<str>>(
        lines: &[S],
        block: &ConflictBlock,
        strategy: Strategy,
    ) -> Result<Resolution, ConflictError> {
        if !block.fits(lines.len()) {
            warn!(block = %block, line_count = lines.len(), "refusing to resolve stale block");
            return Err(ConflictError::StaleBlock {
                end: block.end(),
                line_count: lines.len(),
            });
        }

        let section = |s: Section| -> Result<Vec<String>, ConflictError> {
            block.section(lines, s).ok_or(ConflictError::NoBaseAvailable {
                start: block.start(),
            })
        };

        let replacement = match strategy {
            Strategy::Ours => section(Section::Ours)?,
            Strategy::Theirs => section(Section::Theirs)?,
            Strategy::Both => {
                let mut out = section(Section::Ours)?;
                out.extend(section(Section::Theirs)?);
                out
            }
            Strategy::BothReversed => {
                let mut out = section(Section::Theirs)?;
                out.extend(section(Section::Ours)?);
                out
            }
            Strategy::Base => {
                if !block.has_base() {
                    debug!(start = block.start(), "block has no ancestor section");
                    return Err(ConflictError::NoBaseAvailable {
                        start: block.start(),
                    });
                }
                section(Section::Ancestor)?
            }
            Strategy::None => Vec::new(),
        };

        info!(
            strategy = %strategy,
            start = block.start(),
            end = block.end(),
            replacement_lines = replacement.len(),
            "conflict resolved"
        );

        Ok(Resolution {
            strategy,
            span: block.span(),
            replacement,
        })
    }

    /// Locate the block under the cursor and resolve it.
    pub fn resolve_at_cursor<S: AsRef<str>>(
        lines: &[S],
        cursor_line: usize,
        patterns: &MarkerPatternSet,
        strategy: Strategy,
    ) -> Result<Resolution, ConflictError> {
        let block = locate(lines, cursor_line, patterns)
            .ok_or(ConflictError::NotInConflict { line: cursor_line })?;
        Self::resolve(lines, &block, strategy)
    }

    /// Resolve every block found by a bulk scan.
    ///
    /// Each scanned block is re-checked with the strict cursor lookup from
    /// its first line; blocks the lookup rejects (nested "ours" marker, stray
    /// "theirs" marker before the separator) are skipped and left in place.
    ///
    /// Resolutions are returned bottom-up so they can be applied one after
    /// another without shifting the spans still to come. All-or-nothing: a
    /// single block without a base fails the whole call for
    /// [`Strategy::Base`].
    pub fn resolve_all<S: AsRef<str>>(
        lines: &[S],
        patterns: &MarkerPatternSet,
        strategy: Strategy,
    ) -> Result<Vec<Resolution>, ConflictError> {
        let blocks = scan(lines, patterns);
        let mut resolutions = Vec::with_capacity(blocks.len());
        for block in &blocks {
            if locate(lines, block.start(), patterns).as_ref() != Some(block) {
                warn!(block = %block, "skipping ambiguous block");
                continue;
            }
            resolutions.push(Self::resolve(lines, block, strategy)?);
        }
        resolutions.reverse();
        Ok(resolutions)
    }

    /// Apply a set of non-overlapping resolutions computed against `lines`.
    pub fn apply_all<S: AsRef<str>>(
        lines: &[S],
        resolutions: &[Resolution],
    ) -> Result<Vec<String>, ConflictError> {
        let mut ordered: Vec<&Resolution> = resolutions.iter().collect();
        ordered.sort_by(|a, b| b.span.start.cmp(&a.span.start));

        let mut current: Vec<String> = lines.iter().map(|l| l.as_ref().to_string()).collect();
        for resolution in ordered {
            current = resolution.apply(&current)?;
        }
        Ok(current)
    }
}
