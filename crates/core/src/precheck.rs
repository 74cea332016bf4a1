//! Advisory fast-path verdicts.
//!
//! A host may ask an external tool whether the file on disk contains
//! conflict markers before scanning. The core never runs that check; it only
//! decides whether a verdict may be trusted.

use serde::{Deserialize, Serialize};

/// What the external pre-check reported.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Precheck {
    /// The on-disk file has no conflict markers.
    FastPathClean,
    /// The on-disk file may contain markers.
    MayContainMarkers,
    /// The tool is missing or the check failed.
    Unavailable,
}

/// `true` unless the pre-check reported clean and the in-memory buffer
/// still matches the file on disk.
pub fn must_scan(precheck: Precheck, buffer_modified: bool) -> bool {
    !(precheck == Precheck::FastPathClean && !buffer_modified)
}
