//! Fast pre-check through `git grep`.
//!
//! Asks git whether the file on disk contains an "ours" marker. Whether git
//! is installed is checked once per process.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use conflictmark_core::Precheck;

static GIT_AVAILABLE: OnceCell<bool> = OnceCell::const_new();

/// `true` if a working `git` binary is on `$PATH`.
pub async fn git_available() -> bool {
    *GIT_AVAILABLE
        .get_or_init(|| async {
            let ok = Command::new("git")
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .map(|s| s.success())
                .unwrap_or(false);
            debug!(available = ok, "git availability checked");
            ok
        })
        .await
}

/// Pre-check verdict for a `check` target.
///
/// Stdin (`-`) never matches a file on disk and a missing path cannot be
/// vouched for, so both are inconclusive without running git.
pub async fn verdict_for(path: &Path, ours_pattern: &str) -> Precheck {
    if path == Path::new("-") || !path.is_file() {
        return Precheck::Unavailable;
    }
    run(path, ours_pattern).await
}

/// Run `git grep` for `ours_pattern` against `path`.
///
/// Exit status 0 means a match, 1 means none; anything else (including a
/// pattern git's ERE engine rejects) is inconclusive.
pub async fn run(path: &Path, ours_pattern: &str) -> Precheck {
    if !git_available().await {
        return Precheck::Unavailable;
    }

    // `--no-index` only searches below the working directory.
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let Some(name) = path.file_name() else {
        return Precheck::Unavailable;
    };

    let status = Command::new("git")
        .current_dir(dir)
        .args(["grep", "--no-index", "-q", "-E", "-e", ours_pattern, "--"])
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status.map(|s| s.code()) {
        Ok(Some(0)) => Precheck::MayContainMarkers,
        Ok(Some(1)) => Precheck::FastPathClean,
        Ok(code) => {
            debug!(?code, path = %path.display(), "git grep inconclusive");
            Precheck::Unavailable
        }
        Err(e) => {
            warn!(error = %e, "failed to run git grep");
            Precheck::Unavailable
        }
    }
}
