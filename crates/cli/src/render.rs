//! Terminal rendering of diff plans.

use conflictmark_core::DiffPlan;

use crate::style;

/// Render every job of `plan` as a unified diff.
///
/// With more than one job, each diff is preceded by a header carrying its
/// label; a single diff is printed bare.
pub fn render_plan(plan: &DiffPlan, context_lines: usize) -> String {
    let mut out = String::new();

    for (i, job) in plan.jobs.iter().enumerate() {
        if plan.multiple {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&style::header(&format!("==== {} ====", job.label)));
            out.push('\n');
        }

        let diff = job.unified_diff(context_lines);
        if diff.is_empty() {
            out.push_str(&style::dim(&format!("{}: no differences", job.label)));
            out.push('\n');
            continue;
        }
        for line in diff.lines() {
            out.push_str(&style::diff_line(line));
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use conflictmark_core::{scan, DiffLabels, DiffPair, DiffPlanner, MarkerPatternSet};

    const DIFF3: [&str; 7] = ["<<<<<<< A", "x", "||||||| base", "o", "=======", "y", ">>>>>>> B"];

    fn plan(pairs: &[DiffPair]) -> DiffPlan {
        let block = scan(&DIFF3, &MarkerPatternSet::default())[0];
        DiffPlanner::plan(&DIFF3, &block, pairs, &DiffLabels::default()).unwrap()
    }

    #[test]
    fn test_single_job_has_no_header() {
        console::set_colors_enabled(false);
        let out = render_plan(&plan(&[DiffPair::OursTheirs]), 3);
        assert!(!out.contains("===="));
        assert!(out.starts_with("--- Ours\n+++ Theirs\n"));
    }

    #[test]
    fn test_multiple_jobs_have_headers() {
        console::set_colors_enabled(false);
        let out = render_plan(&plan(&[DiffPair::BaseOurs, DiffPair::OursTheirs]), 3);
        assert!(out.contains("==== Base → Ours ===="));
        assert!(out.contains("==== Ours → Theirs ===="));
        let first = out.find("Base → Ours").unwrap();
        let second = out.find("Ours → Theirs").unwrap();
        assert!(first < second);
    }
}
