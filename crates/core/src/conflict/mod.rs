//! Conflict-region scanning, lookup, resolution, and diff planning.
//!
//! The conflict subsystem is responsible for:
//! 1. **Scanning** -- listing every complete marker block in a line sequence.
//! 2. **Locating** -- strictly finding the block under a cursor.
//! 3. **Resolving** -- turning a block and a strategy into a replacement plan.
//! 4. **Planning diffs** -- choosing and labeling section comparisons.
//!
//! Everything here is a pure function of its inputs. A [`ConflictBlock`] is
//! only valid for the exact lines it was scanned from; re-scan after every
//! edit.

pub mod block;
pub mod locator;
pub mod navigation;
pub mod planner;
pub mod resolver;
pub mod scanner;

pub use block::{ConflictBlock, LineSpan, Section};
pub use locator::locate;
pub use navigation::{next_conflict, previous_conflict};
pub use planner::{DiffJob, DiffLabels, DiffPair, DiffPlan, DiffPlanner};
pub use resolver::{ConflictResolver, Resolution, Strategy};
pub use scanner::{has_conflicts, scan};
