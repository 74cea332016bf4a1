//! conflictmark core library.
//!
//! This crate finds, classifies, and resolves version-control conflict
//! regions embedded in a text buffer: marker classification, bulk scanning,
//! strict cursor lookup, resolution plans, and diff planning between
//! sections. Configuration, background scanning, and the pre-check contract
//! for host integrations live here too.

pub mod background;
pub mod config;
pub mod conflict;
pub mod errors;
pub mod markers;
pub mod precheck;

// Re-exports for convenience.
pub use background::{BackgroundScanner, ScanOutcome, ScanTicket};
pub use config::AppConfig;
pub use conflict::{
    locate, scan, ConflictBlock, ConflictResolver, DiffJob, DiffLabels, DiffPair, DiffPlan,
    DiffPlanner, LineSpan, Resolution, Section, Strategy,
};
pub use errors::{ConfigError, ConflictError, CoreError};
pub use markers::{MarkerKind, MarkerPatternSet};
pub use precheck::{must_scan, Precheck};
