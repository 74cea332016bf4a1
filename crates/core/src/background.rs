//! Off-thread bulk scanning.
//!
//! A [`BackgroundScanner`] runs [`scan`] on tokio's blocking pool over an
//! owned copy of the lines. Every spawn bumps a generation counter; a
//! [`ScanTicket`] whose generation is no longer the latest reports
//! [`ScanOutcome::Stale`] so callers never apply outdated results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::conflict::{scan, ConflictBlock};
use crate::markers::MarkerPatternSet;

/// Result of awaiting a [`ScanTicket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// No newer scan was started and the buffer was not invalidated.
    Current(Vec<ConflictBlock>),
    /// Superseded or invalidated; discard.
    Stale,
}

impl ScanOutcome {
    /// The blocks if current, `None` if stale.
    pub fn into_current(self) -> Option<Vec<ConflictBlock>> {
        match self {
            Self::Current(blocks) => Some(blocks),
            Self::Stale => None,
        }
    }
}

/// Spawns scans for one buffer and tracks which one is the latest.
#[derive(Debug, Clone, Default)]
pub struct BackgroundScanner {
    generation: Arc<AtomicU64>,
}

impl BackgroundScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start scanning `lines` off the async runtime threads.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, lines: Vec<String>, patterns: MarkerPatternSet) -> ScanTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, lines = lines.len(), "spawning background scan");

        let handle = tokio::task::spawn_blocking(move || scan(&lines, &patterns));

        ScanTicket {
            generation,
            latest: Arc::clone(&self.generation),
            handle,
        }
    }

    /// Mark every in-flight scan stale (e.g. the buffer was closed).
    pub fn invalidate(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "background scans invalidated");
    }

    /// The most recent generation handed out.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// Handle to one in-flight scan.
#[derive(Debug)]
pub struct ScanTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
    handle: JoinHandle<Vec<ConflictBlock>>,
}

impl ScanTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` if a newer scan was started or the scanner was invalidated.
    pub fn is_stale(&self) -> bool {
        self.latest.load(Ordering::SeqCst) != self.generation
    }

    /// Wait for the scan and decide whether its result may be applied.
    pub async fn outcome(self) -> ScanOutcome {
        let blocks = match self.handle.await {
            Ok(blocks) => blocks,
            Err(e) => {
                warn!(generation = self.generation, error = %e, "background scan failed");
                return ScanOutcome::Stale;
            }
        };

        // Checked after completion: a newer scan may have started meanwhile.
        if self.latest.load(Ordering::SeqCst) != self.generation {
            debug!(generation = self.generation, "discarding stale scan result");
            return ScanOutcome::Stale;
        }
        ScanOutcome::Current(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflicted() -> Vec<String> {
        ["a", "<<<<<<< A", "x", "=======", "y", ">>>>>>> B"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_single_scan_is_current() {
        let scanner = BackgroundScanner::new();
        let ticket = scanner.spawn(conflicted(), MarkerPatternSet::default());
        assert!(!ticket.is_stale());

        let blocks = ticket.outcome().await.into_current().expect("current");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start(), 2);
    }

    #[tokio::test]
    async fn test_matches_synchronous_scan() {
        let lines = conflicted();
        let patterns = MarkerPatternSet::default();
        let expected = scan(&lines, &patterns);

        let scanner = BackgroundScanner::new();
        let outcome = scanner.spawn(lines, patterns).outcome().await;
        assert_eq!(outcome, ScanOutcome::Current(expected));
    }

    #[tokio::test]
    async fn test_newer_scan_supersedes_older() {
        let scanner = BackgroundScanner::new();
        let first = scanner.spawn(conflicted(), MarkerPatternSet::default());
        let second = scanner.spawn(vec!["clean".into()], MarkerPatternSet::default());

        assert!(first.is_stale());
        assert_eq!(first.outcome().await, ScanOutcome::Stale);
        assert_eq!(second.outcome().await, ScanOutcome::Current(vec![]));
    }

    #[tokio::test]
    async fn test_invalidate_discards_in_flight() {
        let scanner = BackgroundScanner::new();
        let ticket = scanner.spawn(conflicted(), MarkerPatternSet::default());
        scanner.invalidate();
        assert_eq!(ticket.outcome().await, ScanOutcome::Stale);
    }

    #[tokio::test]
    async fn test_clones_share_generation() {
        let scanner = BackgroundScanner::new();
        let other = scanner.clone();
        let ticket = scanner.spawn(conflicted(), MarkerPatternSet::default());
        other.invalidate();
        assert!(ticket.is_stale());
        assert_eq!(scanner.generation(), 2);
    }
}
