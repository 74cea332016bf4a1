//! Jumping between conflicts.
//!
//! Pure functions over the ordered output of a bulk scan.

use super::block::ConflictBlock;

/// The first block starting strictly below `cursor_line`.
///
/// With `wrap`, falls back to the first block in the buffer.
pub fn next_conflict(
    blocks: &[ConflictBlock],
    cursor_line: usize,
    wrap: bool,
) -> Option<ConflictBlock> {
    blocks
        .iter()
        .find(|b| b.start() > cursor_line)
        .or_else(|| if wrap { blocks.first() } else { None })
        .copied()
}

/// The last block starting strictly above `cursor_line`.
///
/// With `wrap`, falls back to the last block in the buffer.
pub fn previous_conflict(
    blocks: &[ConflictBlock],
    cursor_line: usize,
    wrap: bool,
) -> Option<ConflictBlock> {
    blocks
        .iter()
        .rev()
        .find(|b| b.start() < cursor_line)
        .or_else(|| if wrap { blocks.last() } else { None })
        .copied()
}
