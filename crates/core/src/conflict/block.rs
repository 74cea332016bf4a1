//! Conflict block data model.
//!
//! A [`ConflictBlock`] is a snapshot of marker positions (1-based line
//! numbers) taken at scan time. It is only meaningful against the exact line
//! sequence it was scanned from.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Line spans
// ---------------------------------------------------------------------------

/// An inclusive range of 1-based line numbers.
///
/// An empty span has `end == start - 1` (e.g. a section with adjacent
/// markers).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of lines covered.
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if `line` lies within the span.
    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && line <= self.end
    }

    /// Borrow the covered lines out of a line sequence.
    ///
    /// Returns `None` if the span runs past the end of `lines`.
    pub fn slice<'a, S: AsRef<str>>(&self, lines: &'a [S]) -> Option<&'a [S]> {
        if self.is_empty() {
            return Some(&lines[..0]);
        }
        if self.start == 0 || self.end > lines.len() {
            return None;
        }
        Some(&lines[self.start - 1..self.end])
    }
}

impl std::fmt::Display for LineSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// A content region of a conflict block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Ours,
    Ancestor,
    Theirs,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ours => write!(f, "ours"),
            Self::Ancestor => write!(f, "ancestor"),
            Self::Theirs => write!(f, "theirs"),
        }
    }
}

// ---------------------------------------------------------------------------
// ConflictBlock
// ---------------------------------------------------------------------------

/// One complete marker-delimited conflict region.
///
/// Invariants: `ours_start < separator < theirs_end`, and when present
/// `ours_start < ancestor < separator`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ConflictBlock {
    ours_start: usize,
    ancestor: Option<usize>,
    separator: usize,
    theirs_end: usize,
}

impl ConflictBlock {
    /// Build a block from marker positions.
    ///
    /// Returns `None` when the positions violate the ordering invariants.
    pub fn new(
        ours_start: usize,
        ancestor: Option<usize>,
        separator: usize,
        theirs_end: usize,
    ) -> Option<Self> {
        if ours_start == 0 || ours_start >= separator || separator >= theirs_end {
            return None;
        }
        if let Some(a) = ancestor {
            if a <= ours_start || a >= separator {
                return None;
            }
        }
        Some(Self {
            ours_start,
            ancestor,
            separator,
            theirs_end,
        })
    }

    /// Line of the "ours" marker.
    pub fn start(&self) -> usize {
        self.ours_start
    }

    pub fn ours_start(&self) -> usize {
        self.ours_start
    }

    /// Line of the "ancestor" marker, present only in diff3-style blocks.
    pub fn ancestor(&self) -> Option<usize> {
        self.ancestor
    }

    pub fn separator(&self) -> usize {
        self.separator
    }

    pub fn theirs_end(&self) -> usize {
        self.theirs_end
    }

    /// Line of the "theirs" marker.
    pub fn end(&self) -> usize {
        self.theirs_end
    }

    pub fn has_base(&self) -> bool {
        self.ancestor.is_some()
    }

    /// The whole block, both boundary markers included.
    pub fn span(&self) -> LineSpan {
        LineSpan::new(self.ours_start, self.theirs_end)
    }

    /// Content lines of the "ours" section.
    pub fn ours_range(&self) -> LineSpan {
        let stop = self.ancestor.unwrap_or(self.separator);
        LineSpan::new(self.ours_start + 1, stop - 1)
    }

    /// Content lines of the "ancestor" section.
    pub fn ancestor_range(&self) -> Option<LineSpan> {
        self.ancestor
            .map(|a| LineSpan::new(a + 1, self.separator - 1))
    }

    /// Content lines of the "theirs" section.
    pub fn theirs_range(&self) -> LineSpan {
        LineSpan::new(self.separator + 1, self.theirs_end - 1)
    }

    /// Content span of `section`, `None` for a missing ancestor.
    pub fn section_range(&self, section: Section) -> Option<LineSpan> {
        match section {
            Section::Ours => Some(self.ours_range()),
            Section::Ancestor => self.ancestor_range(),
            Section::Theirs => Some(self.theirs_range()),
        }
    }

    /// `true` if `line` lies between the two boundary markers (inclusive).
    pub fn contains(&self, line: usize) -> bool {
        self.span().contains(line)
    }

    /// `true` if the block's span fits inside a sequence of `line_count` lines.
    pub fn fits(&self, line_count: usize) -> bool {
        self.theirs_end <= line_count
    }

    /// Copy the content lines of `section` out of the scanned line sequence.
    ///
    /// Returns `None` if the section is absent or the block no longer fits
    /// `lines`.
    pub fn section<S: AsRef<str>>(&self, lines: &[S], section: Section) -> Option<Vec<String>> {
        if !self.fits(lines.len()) {
            return None;
        }
        let span = self.section_range(section)?;
        span.slice(lines)
            .map(|s| s.iter().map(|l| l.as_ref().to_string()).collect())
    }
}

impl std::fmt::Display for ConflictBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ancestor {
            Some(a) => write!(
                f,
                "conflict {}-{} (ancestor {}, separator {})",
                self.ours_start, self.theirs_end, a, self.separator
            ),
            None => write!(
                f,
                "conflict {}-{} (separator {})",
                self.ours_start, self.theirs_end, self.separator
            ),
        }
    }
}
