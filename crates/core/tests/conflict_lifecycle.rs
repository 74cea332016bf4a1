//! End-to-end tests for the conflict lifecycle on realistic buffers:
//! scan -> locate -> resolve -> apply -> rescan, and diff planning.
//!
//! No I/O except the config-file test, which uses a temp directory.

use std::io::Write;

use conflictmark_core::conflict::{next_conflict, previous_conflict};
use conflictmark_core::{
    locate, scan, AppConfig, BackgroundScanner, ConflictError, ConflictResolver, DiffLabels,
    DiffPair, DiffPlanner, MarkerPatternSet, ScanOutcome, Strategy,
};

// ===========================================================================
// Helpers
// ===========================================================================

fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

const MERGED_SOURCE: &str = "\
use std::io;

fn greeting() -> &'static str {
<<<<<<< HEAD
    \"hello\"
=======
    \"howdy\"
>>>>>>> feature/greeting
}

fn farewell() -> &'static str {
<<<<<<< HEAD
    \"bye\"
||||||| merged common ancestors
    \"goodbye\"
=======
    \"see you\"
    // shorter
>>>>>>> feature/greeting
}
";

// ===========================================================================
// Scanning
// ===========================================================================

#[test]
fn test_scan_realistic_buffer() {
    let buf = lines(MERGED_SOURCE);
    let blocks = scan(&buf, &MarkerPatternSet::default());

    assert_eq!(blocks.len(), 2);
    assert_eq!((blocks[0].start(), blocks[0].separator(), blocks[0].end()), (4, 6, 8));
    assert_eq!(blocks[0].ancestor(), None);
    assert_eq!(blocks[1].start(), 12);
    assert_eq!(blocks[1].ancestor(), Some(14));
    assert_eq!(blocks[1].separator(), 16);
    assert_eq!(blocks[1].end(), 19);
}

#[test]
fn test_scan_conflict_free_is_empty() {
    let buf = lines("fn main() {\n    let a = b << 2;\n    println!(\"==\");\n}\n");
    assert!(scan(&buf, &MarkerPatternSet::default()).is_empty());
}

#[test]
fn test_example_one() {
    let buf = ["<<<<<<< A", "x", "=======", "y", ">>>>>>> B"];
    let p = MarkerPatternSet::default();
    let blocks = scan(&buf, &p);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].ours_start(), 1);
    assert_eq!(blocks[0].ancestor(), None);
    assert_eq!(blocks[0].separator(), 3);
    assert_eq!(blocks[0].theirs_end(), 5);

    let r = ConflictResolver::resolve(&buf, &blocks[0], Strategy::Ours).unwrap();
    assert_eq!(r.replacement, vec!["x".to_string()]);
    assert_eq!((r.span.start, r.span.end), (1, 5));
}

#[test]
fn test_example_two() {
    let buf = ["<<<<<<< A", "x", "||||||| base", "o", "=======", "y", ">>>>>>> B"];
    let p = MarkerPatternSet::default();
    let blocks = scan(&buf, &p);
    assert_eq!(blocks[0].ancestor(), Some(3));
    assert_eq!(blocks[0].separator(), 5);
    assert_eq!(blocks[0].theirs_end(), 7);

    let r = ConflictResolver::resolve(&buf, &blocks[0], Strategy::Base).unwrap();
    assert_eq!(r.replacement, vec!["o".to_string()]);
}

#[test]
fn test_example_three() {
    let buf = ["<<<<<<< A", ">>>>>>> B"];
    let p = MarkerPatternSet::default();
    assert!(scan(&buf, &p).is_empty());
    assert!(locate(&buf, 1, &p).is_none());
}

// ===========================================================================
// Resolution
// ===========================================================================

#[test]
fn test_resolve_then_rescan_leaves_other_block() {
    let buf = lines(MERGED_SOURCE);
    let p = MarkerPatternSet::default();

    let r = ConflictResolver::resolve_at_cursor(&buf, 5, &p, Strategy::Theirs).unwrap();
    let after = r.apply(&buf).unwrap();

    assert_eq!(after[3], "    \"howdy\"");
    let remaining = scan(&after, &p);
    assert_eq!(remaining.len(), 1);
    // The second block moved up by the four removed lines.
    assert_eq!(remaining[0].start(), 8);
}

#[test]
fn test_resolve_every_block_fully_resolves() {
    let buf = lines(MERGED_SOURCE);
    let p = MarkerPatternSet::default();

    let mut current = buf.clone();
    loop {
        let blocks = scan(&current, &p);
        let Some(first) = blocks.first() else { break };
        let r = ConflictResolver::resolve(&current, first, Strategy::Both).unwrap();
        current = r.apply(&current).unwrap();
    }

    assert!(scan(&current, &p).is_empty());
    assert!(current.contains(&"    \"see you\"".to_string()));
    assert!(!current.iter().any(|l| l.contains("goodbye")));
}

#[test]
fn test_resolve_none_removes_block_at_location() {
    let buf = lines(MERGED_SOURCE);
    let p = MarkerPatternSet::default();
    for block in scan(&buf, &p) {
        let r = ConflictResolver::resolve(&buf, &block, Strategy::None).unwrap();
        let after = r.apply(&buf).unwrap();
        assert!(scan(&after, &p).iter().all(|b| b.start() != block.start()));
    }
}

#[test]
fn test_base_on_two_way_block() {
    let buf = lines(MERGED_SOURCE);
    let p = MarkerPatternSet::default();
    let err = ConflictResolver::resolve_at_cursor(&buf, 4, &p, Strategy::Base);
    assert_eq!(err, Err(ConflictError::NoBaseAvailable { start: 4 }));
}

#[test]
fn test_not_in_conflict_outside_blocks() {
    let buf = lines(MERGED_SOURCE);
    let p = MarkerPatternSet::default();
    for cursor in [1, 3, 9, 10, 20] {
        let err = ConflictResolver::resolve_at_cursor(&buf, cursor, &p, Strategy::Ours);
        assert_eq!(err, Err(ConflictError::NotInConflict { line: cursor }));
    }
}

#[test]
fn test_resolve_all_and_apply() {
    let buf = lines(MERGED_SOURCE);
    let p = MarkerPatternSet::default();
    let rs = ConflictResolver::resolve_all(&buf, &p, Strategy::Ours).unwrap();
    let after = ConflictResolver::apply_all(&buf, &rs).unwrap();
    assert!(scan(&after, &p).is_empty());
    assert_eq!(after.len(), buf.len() - 4 - 7);
}

#[test]
fn test_resolve_all_never_leaks_markers() {
    let buf = ["<<<<<<< outer", "x", "<<<<<<< inner", "=======", "y", ">>>>>>> B"];
    let p = MarkerPatternSet::default();
    assert!(locate(&buf, 2, &p).is_none());

    let rs = ConflictResolver::resolve_all(&buf, &p, Strategy::Ours).unwrap();
    let after = ConflictResolver::apply_all(&buf, &rs).unwrap();

    // The malformed region is left exactly as it was.
    assert_eq!(after, buf);
    assert_eq!(after.iter().filter(|l| p.classify(l).is_some()).count(), 4);
}

// ===========================================================================
// Diff planning
// ===========================================================================

#[test]
fn test_example_four() {
    let buf = lines(MERGED_SOURCE);
    let p = MarkerPatternSet::default();
    let plan =
        DiffPlanner::plan_at_cursor(&buf, 5, &p, &[DiffPair::OursTheirs], &DiffLabels::default())
            .unwrap();
    assert_eq!(plan.jobs.len(), 1);
    assert_eq!(plan.jobs[0].label, "Ours → Theirs");
    assert!(!plan.multiple);
}

#[test]
fn test_example_five() {
    let buf = lines(MERGED_SOURCE);
    let p = MarkerPatternSet::default();
    let result = DiffPlanner::plan_at_cursor(
        &buf,
        5,
        &p,
        &[DiffPair::BaseOurs, DiffPair::OursTheirs, DiffPair::TheirsOurs],
        &DiffLabels::default(),
    );
    assert_eq!(result, Err(ConflictError::NoBaseAvailable { start: 4 }));
}

#[test]
fn test_diff3_plan_renders() {
    let buf = lines(MERGED_SOURCE);
    let p = MarkerPatternSet::default();
    let plan = DiffPlanner::plan_at_cursor(
        &buf,
        15,
        &p,
        &[DiffPair::BaseOurs, DiffPair::BaseTheirs],
        &DiffLabels::default(),
    )
    .unwrap();
    assert!(plan.multiple);
    assert_eq!(plan.jobs[1].label, "Base → Theirs");
    let diff = plan.jobs[1].unified_diff(3);
    assert!(diff.contains("+    // shorter"));
    assert!(diff.contains("-    \"goodbye\""));
}

// ===========================================================================
// Navigation, config, background
// ===========================================================================

#[test]
fn test_navigation_over_scan() {
    let buf = lines(MERGED_SOURCE);
    let blocks = scan(&buf, &MarkerPatternSet::default());
    assert_eq!(next_conflict(&blocks, 1, false).map(|b| b.start()), Some(4));
    assert_eq!(next_conflict(&blocks, 4, false).map(|b| b.start()), Some(12));
    assert_eq!(previous_conflict(&blocks, 12, false).map(|b| b.start()), Some(4));
    assert_eq!(next_conflict(&blocks, 12, true).map(|b| b.start()), Some(4));
}

#[test]
fn test_custom_grammar_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conflictmark.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(
        br#"
[markers]
ours = '^@@ ours'
theirs = '^@@ theirs'
ancestor = '^@@ base'
separator = '^@@ ----$'

[labels]
ours = "local"
theirs = "remote"
"#,
    )
    .unwrap();

    let config = AppConfig::load_and_validate(&path).unwrap();
    let p = config.marker_patterns().unwrap();
    let buf = ["@@ ours", "a", "@@ base", "o", "@@ ----", "b", "@@ theirs"];
    let block = locate(&buf, 2, &p).unwrap();
    assert_eq!(block.ancestor(), Some(3));

    let plan =
        DiffPlanner::plan(&buf, &block, &[DiffPair::TheirsOurs], &config.diff_labels()).unwrap();
    assert_eq!(plan.jobs[0].label, "remote → local");
}

#[test]
fn test_block_serializes_for_hosts() {
    let buf = ["<<<<<<< A", "x", "||||||| base", "o", "=======", "y", ">>>>>>> B"];
    let blocks = scan(&buf, &MarkerPatternSet::default());
    let json = serde_json::to_value(blocks[0]).unwrap();
    assert_eq!(json["ours_start"], 1);
    assert_eq!(json["ancestor"], 3);
    assert_eq!(json["separator"], 5);
    assert_eq!(json["theirs_end"], 7);
}

#[tokio::test]
async fn test_background_scan_matches_foreground() {
    let buf = lines(MERGED_SOURCE);
    let p = MarkerPatternSet::default();
    let expected = scan(&buf, &p);

    let scanner = BackgroundScanner::new();
    let stale = scanner.spawn(buf.clone(), p.clone());
    let fresh = scanner.spawn(buf, p);

    assert_eq!(stale.outcome().await, ScanOutcome::Stale);
    assert_eq!(fresh.outcome().await, ScanOutcome::Current(expected));
}
