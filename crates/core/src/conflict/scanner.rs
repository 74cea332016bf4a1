//! Bulk conflict-block scanner.
//!
//! A single linear pass over the line sequence that emits every complete
//! block. The scanner is lenient: malformed or truncated regions simply do not
//! produce a block. A second "ours" marker inside an open block is not treated
//! as a boundary; the cursor locator is the strict counterpart.

use tracing::{debug, info};

use super::block::ConflictBlock;
use crate::markers::{MarkerKind, MarkerPatternSet};

/// Scanner state between lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    InOurs {
        ours_start: usize,
    },
    /// Past the ancestor marker, still waiting for the separator.
    InAncestor {
        ours_start: usize,
        ancestor: usize,
    },
    InTheirs {
        ours_start: usize,
        ancestor: Option<usize>,
        separator: usize,
    },
}

/// Scan `lines` and return all complete conflict blocks in order.
pub fn scan<S: AsRef<str>>(lines: &[S], patterns: &MarkerPatternSet) -> Vec<ConflictBlock> {
    let mut blocks = Vec::new();
    let mut state = ScanState::Outside;

    for (idx, line) in lines.iter().enumerate() {
        let lnum = idx + 1;
        let kind = patterns.classify(line.as_ref());

        state = match (state, kind) {
            (ScanState::Outside, Some(MarkerKind::Ours)) => {
                ScanState::InOurs { ours_start: lnum }
            }
            (ScanState::InOurs { ours_start }, Some(MarkerKind::Ancestor)) => {
                ScanState::InAncestor {
                    ours_start,
                    ancestor: lnum,
                }
            }
            (ScanState::InOurs { ours_start }, Some(MarkerKind::Separator)) => {
                ScanState::InTheirs {
                    ours_start,
                    ancestor: None,
                    separator: lnum,
                }
            }
            (
                ScanState::InAncestor {
                    ours_start,
                    ancestor,
                },
                Some(MarkerKind::Separator),
            ) => ScanState::InTheirs {
                ours_start,
                ancestor: Some(ancestor),
                separator: lnum,
            },
            (
                ScanState::InTheirs {
                    ours_start,
                    ancestor,
                    separator,
                },
                Some(MarkerKind::Theirs),
            ) => {
                if let Some(block) = ConflictBlock::new(ours_start, ancestor, separator, lnum) {
                    debug!(
                        start = block.start(),
                        end = block.end(),
                        diff3 = block.has_base(),
                        "conflict block found"
                    );
                    blocks.push(block);
                }
                ScanState::Outside
            }
            (unchanged, _) => unchanged,
        };
    }

    if state != ScanState::Outside {
        debug!(?state, "dropping incomplete trailing block");
    }

    info!(
        lines = lines.len(),
        blocks = blocks.len(),
        "conflict scan complete"
    );
    blocks
}

/// `true` if `lines` contains at least one complete conflict block.
pub fn has_conflicts<S: AsRef<str>>(lines: &[S], patterns: &MarkerPatternSet) -> bool {
    !scan(lines, patterns).is_empty()
}
