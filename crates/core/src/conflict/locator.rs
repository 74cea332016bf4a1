//! Strict "conflict at cursor" lookup.
//!
//! Unlike the bulk scanner, the locator refuses anything ambiguous: a nested
//! "ours" marker, a missing separator, or a missing terminator all yield
//! `None`. Its result gates destructive rewrites, so absence is the safe
//! answer.

use tracing::debug;

use super::block::ConflictBlock;
use crate::markers::{MarkerKind, MarkerPatternSet};

/// Find the conflict block enclosing `cursor_line` (1-based).
///
/// A "theirs" marker on the cursor line itself belongs to the enclosing
/// block, so the backward search only treats "theirs" markers strictly above
/// the cursor as the end of an earlier block.
pub fn locate<S: AsRef<str>>(
    lines: &[S],
    cursor_line: usize,
    patterns: &MarkerPatternSet,
) -> Option<ConflictBlock> {
    if cursor_line == 0 || cursor_line > lines.len() {
        debug!(cursor_line, line_count = lines.len(), "cursor outside buffer");
        return None;
    }

    let ours_start = find_ours_above(lines, cursor_line, patterns)?;

    let mut ancestor = None;
    let mut separator = None;
    let mut theirs_end = None;

    for (idx, line) in lines.iter().enumerate().skip(ours_start) {
        let lnum = idx + 1;
        match patterns.classify(line.as_ref()) {
            Some(MarkerKind::Ours) if separator.is_none() => {
                debug!(ours_start, nested = lnum, "nested ours marker, refusing block");
                return None;
            }
            Some(MarkerKind::Ancestor) if separator.is_none() && ancestor.is_none() => {
                ancestor = Some(lnum);
            }
            Some(MarkerKind::Separator) if separator.is_none() => {
                separator = Some(lnum);
            }
            Some(MarkerKind::Theirs) => {
                theirs_end = Some(lnum);
                break;
            }
            _ => {}
        }
    }

    let (Some(separator), Some(theirs_end)) = (separator, theirs_end) else {
        debug!(ours_start, "incomplete block at cursor");
        return None;
    };

    if cursor_line > theirs_end {
        return None;
    }

    let block = ConflictBlock::new(ours_start, ancestor, separator, theirs_end);
    if let Some(ref b) = block {
        debug!(cursor_line, block = %b, "conflict located at cursor");
    }
    block
}

/// Walk up from the cursor to the nearest "ours" marker, giving up at a
/// "theirs" marker above the cursor.
fn find_ours_above<S: AsRef<str>>(
    lines: &[S],
    cursor_line: usize,
    patterns: &MarkerPatternSet,
) -> Option<usize> {
    for lnum in (1..=cursor_line).rev() {
        match patterns.classify(lines[lnum - 1].as_ref()) {
            Some(MarkerKind::Ours) => return Some(lnum),
            Some(MarkerKind::Theirs) if lnum != cursor_line => return None,
            _ => {}
        }
    }
    None
}
