//! File-backed line buffer.
//!
//! Reads a file (or stdin for `-`) into lines and writes lines back with the
//! original line ending and trailing-newline convention.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Lines of a text file plus what is needed to write it back unchanged.
#[derive(Debug, Clone)]
pub struct Buffer {
    pub path: PathBuf,
    pub lines: Vec<String>,
    crlf: bool,
    trailing_newline: bool,
}

impl Buffer {
    /// Read `path`, or stdin when `path` is `-`.
    pub fn read(path: &Path) -> Result<Self> {
        let text = if path == Path::new("-") {
            let mut s = String::new();
            std::io::stdin()
                .read_to_string(&mut s)
                .context("failed to read stdin")?;
            s
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?
        };
        let buffer = Self::from_text(path, &text);
        debug!(path = %path.display(), lines = buffer.lines.len(), crlf = buffer.crlf, "buffer read");
        Ok(buffer)
    }

    /// Split `text` into lines.
    ///
    /// Mixed line endings are normalised on write to whatever the first line
    /// uses. A stray `\r` left on a line is dropped so marker patterns see the
    /// bare marker text.
    pub fn from_text(path: &Path, text: &str) -> Self {
        let crlf = text
            .find('\n')
            .is_some_and(|i| text[..i].ends_with('\r'));
        Self {
            path: path.to_path_buf(),
            lines: text
                .lines()
                .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
                .collect(),
            crlf,
            trailing_newline: text.ends_with('\n'),
        }
    }

    /// `true` when the buffer came from stdin rather than a file on disk.
    pub fn is_stdin(&self) -> bool {
        self.path == Path::new("-")
    }

    /// Render `lines` using this buffer's line ending conventions.
    pub fn render(&self, lines: &[String]) -> String {
        let eol = if self.crlf { "\r\n" } else { "\n" };
        let mut text = lines.join(eol);
        if self.trailing_newline && !lines.is_empty() {
            text.push_str(eol);
        }
        text
    }

    /// Replace the file's contents with `lines`.
    pub fn write(&self, lines: &[String]) -> Result<()> {
        if self.is_stdin() {
            anyhow::bail!("cannot write back to stdin; omit --write to print the result");
        }
        std::fs::write(&self.path, self.render(lines))
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), lines = lines.len(), "buffer written");
        Ok(())
    }
}
