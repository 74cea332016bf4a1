//! Terminal styling for conflictmark output.
//!
//! Colors are dropped automatically when stdout is not a terminal, or after
//! `console::set_colors_enabled(false)` (`--no-color`, `[diff] color = false`).

use console::Style;

fn status(symbol: &str, style: Style, msg: &str) -> String {
    format!("{} {}", style.apply_to(symbol), msg)
}

/// Clean file, or conflicts written out.
pub fn success(msg: &str) -> String {
    status("✓", Style::new().green(), msg)
}

/// Conflicts remain in a checked file.
pub fn error(msg: &str) -> String {
    status("✗", Style::new().red(), msg)
}

/// No-op notifications: no conflict under the cursor, no base section,
/// malformed blocks left alone.
pub fn warn(msg: &str) -> String {
    status("⚠", Style::new().yellow(), msg)
}

/// Section titles such as `Conflict at lines 4-8` or `==== Ours → Theirs ====`.
pub fn header(msg: &str) -> String {
    Style::new().bold().apply_to(msg).to_string()
}

pub fn dim(msg: &str) -> String {
    Style::new().dim().apply_to(msg).to_string()
}

/// Color one line of unified diff output by its prefix.
pub fn diff_line(line: &str) -> String {
    let style = if line.starts_with("+++") || line.starts_with("---") {
        Style::new().bold()
    } else if line.starts_with('+') {
        Style::new().green()
    } else if line.starts_with('-') {
        Style::new().red()
    } else if line.starts_with("@@") {
        Style::new().cyan()
    } else {
        Style::new()
    };
    style.apply_to(line).to_string()
}
