//! conflictmark command-line tool.
//!
//! Lists, inspects, resolves, and diffs merge-conflict regions in a text
//! file. Resolution commands act on the conflict under a given line and
//! refuse to touch anything ambiguous.

mod buffer;
mod precheck;
mod render;
mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use conflictmark_core::conflict::{next_conflict, previous_conflict};
use conflictmark_core::{
    locate, must_scan, scan, AppConfig, BackgroundScanner, ConflictBlock, ConflictError,
    ConflictResolver, DiffPair, DiffPlanner, MarkerPatternSet, Section, Strategy,
};

use buffer::Buffer;

/// Exit status when conflicts remain or the action was a no-op.
const EXIT_CONFLICTS: u8 = 1;
/// Exit status for real failures (bad input, I/O, configuration).
const EXIT_ERROR: u8 = 2;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// conflictmark command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "conflictmark",
    version,
    about = "Find, resolve, and diff merge-conflict markers in text files"
)]
struct Cli {
    /// Path to the TOML configuration file (default: <config dir>/conflictmark/config.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every conflict in a file.
    List {
        /// File to scan (`-` for stdin).
        file: PathBuf,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the conflict enclosing a line.
    Show {
        file: PathBuf,

        /// 1-based line number.
        #[arg(short, long)]
        line: usize,

        #[arg(long)]
        json: bool,
    },

    /// Print the first line of the next conflict below a line.
    Next {
        file: PathBuf,

        #[arg(short, long, default_value = "0")]
        line: usize,

        /// Do not wrap around to the top of the file.
        #[arg(long)]
        no_wrap: bool,
    },

    /// Print the first line of the previous conflict above a line.
    Prev {
        file: PathBuf,

        #[arg(short, long)]
        line: usize,

        /// Do not wrap around to the bottom of the file.
        #[arg(long)]
        no_wrap: bool,
    },

    /// Resolve the conflict under a line, or every conflict in the file.
    Resolve {
        file: PathBuf,

        /// 1-based line inside the conflict.
        #[arg(short, long, required_unless_present = "all", conflicts_with = "all")]
        line: Option<usize>,

        /// Resolve every conflict found by a scan.
        #[arg(long)]
        all: bool,

        /// ours, theirs, both, both-reversed, base or none.
        #[arg(short, long)]
        strategy: Strategy,

        /// Write the result back to the file instead of printing it.
        #[arg(short, long)]
        write: bool,
    },

    /// Diff sections of the conflict under a line.
    Diff {
        file: PathBuf,

        #[arg(short, long)]
        line: usize,

        /// Comma-separated pairs: base-ours, base-theirs, ours-theirs, theirs-ours.
        #[arg(short, long, value_delimiter = ',', default_value = "ours-theirs")]
        pairs: Vec<DiffPair>,

        /// Disable colored output.
        #[arg(long)]
        no_color: bool,
    },

    /// Exit 0 if the file has no conflicts, 1 otherwise.
    Check {
        file: PathBuf,

        /// Ask `git grep` first and skip the scan when it reports a clean file.
        #[arg(long)]
        precheck: bool,
    },

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./conflictmark.toml")]
        output: PathBuf,
    },

    /// Validate the configuration file.
    Validate,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // Recoverable outcomes are notifications, not failures.
            if let Some(err) = e.downcast_ref::<ConflictError>() {
                if matches!(
                    err,
                    ConflictError::NotInConflict { .. } | ConflictError::NoBaseAvailable { .. }
                ) {
                    eprintln!("{}", style::warn(&err.to_string()));
                    return ExitCode::from(EXIT_CONFLICTS);
                }
            }
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Init { ref output } => {
            init_logging(cli.log_level.as_deref().unwrap_or("warn"));
            cmd_init(output)
        }
        Commands::Validate => {
            init_logging(cli.log_level.as_deref().unwrap_or("warn"));
            cmd_validate(cli.config.as_deref())
        }
        _ => {
            let config = load_config(cli.config.as_deref())?;
            init_logging(cli.log_level.as_deref().unwrap_or(&config.log.level));
            let patterns = config
                .marker_patterns()
                .context("failed to compile marker patterns")?;

            match cli.command {
                Commands::List { file, json } => cmd_list(&file, &patterns, json).await,
                Commands::Show { file, line, json } => cmd_show(&file, line, &patterns, json),
                Commands::Next {
                    file,
                    line,
                    no_wrap,
                } => cmd_jump(&file, line, &patterns, true, !no_wrap).await,
                Commands::Prev {
                    file,
                    line,
                    no_wrap,
                } => cmd_jump(&file, line, &patterns, false, !no_wrap).await,
                Commands::Resolve {
                    file,
                    line,
                    all,
                    strategy,
                    write,
                } => cmd_resolve(&file, line, all, strategy, write, &patterns).await,
                Commands::Diff {
                    file,
                    line,
                    pairs,
                    no_color,
                } => cmd_diff(&file, line, &pairs, no_color, &config, &patterns),
                Commands::Check { file, precheck } => {
                    cmd_check(&file, precheck, &config, &patterns).await
                }
                Commands::Init { .. } | Commands::Validate => unreachable!(),
            }
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn discover_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("conflictmark").join("config.toml"))
        .filter(|p| p.exists())
}

fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match explicit.map(Path::to_path_buf).or_else(discover_config_path) {
        Some(path) => AppConfig::load_and_validate(&path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => {
            let mut config = AppConfig::default();
            config.resolve_env_overrides();
            config
                .validate()
                .context("built-in configuration is invalid")?;
            Ok(config)
        }
    }
}

/// Bulk scan off the main thread, the way an interactive host would.
async fn scan_in_background(
    buffer: &Buffer,
    patterns: &MarkerPatternSet,
) -> Result<Vec<ConflictBlock>> {
    let scanner = BackgroundScanner::new();
    scanner
        .spawn(buffer.lines.clone(), patterns.clone())
        .outcome()
        .await
        .into_current()
        .context("background scan was discarded")
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

async fn cmd_list(file: &Path, patterns: &MarkerPatternSet, json: bool) -> Result<ExitCode> {
    let buffer = Buffer::read(file)?;
    let blocks = scan_in_background(&buffer, patterns).await?;

    if json {
        let report = serde_json::json!({
            "file": file.display().to_string(),
            "count": blocks.len(),
            "blocks": blocks,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    if blocks.is_empty() {
        println!("{}", style::success("No conflicts found"));
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{}",
        style::header(&format!("{} ({} conflicts)", file.display(), blocks.len()))
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Lines", "Style", "Ours", "Base", "Theirs"]);

    for (i, b) in blocks.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(b.span()),
            Cell::new(if b.has_base() { "diff3" } else { "merge" }),
            Cell::new(section_len(b, Section::Ours)),
            Cell::new(section_len(b, Section::Ancestor)),
            Cell::new(section_len(b, Section::Theirs)),
        ]);
    }

    println!("{}", table);
    Ok(ExitCode::SUCCESS)
}

fn cmd_show(
    file: &Path,
    line: usize,
    patterns: &MarkerPatternSet,
    json: bool,
) -> Result<ExitCode> {
    let buffer = Buffer::read(file)?;
    let block = locate(&buffer.lines, line, patterns).ok_or(ConflictError::NotInConflict { line })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&block)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", style::header(&format!("Conflict at lines {}", block.span())));
    println!();
    println!("  Ours marker     : {}", block.ours_start());
    println!(
        "  Ancestor marker : {}",
        block
            .ancestor()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  Separator       : {}", block.separator());
    println!("  Theirs marker   : {}", block.theirs_end());
    println!();
    println!("  Ours lines      : {}", section_len(&block, Section::Ours));
    println!("  Base lines      : {}", section_len(&block, Section::Ancestor));
    println!("  Theirs lines    : {}", section_len(&block, Section::Theirs));

    Ok(ExitCode::SUCCESS)
}

async fn cmd_jump(
    file: &Path,
    line: usize,
    patterns: &MarkerPatternSet,
    forward: bool,
    wrap: bool,
) -> Result<ExitCode> {
    let buffer = Buffer::read(file)?;
    let blocks = scan_in_background(&buffer, patterns).await?;

    let target = if forward {
        next_conflict(&blocks, line, wrap)
    } else {
        previous_conflict(&blocks, line, wrap)
    };

    match target {
        Some(block) => {
            println!("{}", block.start());
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("{}", style::warn("no conflict in that direction"));
            Ok(ExitCode::from(EXIT_CONFLICTS))
        }
    }
}

async fn cmd_resolve(
    file: &Path,
    line: Option<usize>,
    all: bool,
    strategy: Strategy,
    write: bool,
    patterns: &MarkerPatternSet,
) -> Result<ExitCode> {
    let buffer = Buffer::read(file)?;

    let (resolved, new_lines) = if all {
        let resolutions = ConflictResolver::resolve_all(&buffer.lines, patterns, strategy)?;
        if resolutions.is_empty() {
            let found = scan(&buffer.lines, patterns).len();
            if found == 0 {
                eprintln!("{}", style::success("No conflicts found"));
                return Ok(ExitCode::SUCCESS);
            }
            eprintln!(
                "{}",
                style::warn(&format!(
                    "{} malformed conflict(s) left untouched; resolve them by hand",
                    found
                ))
            );
            return Ok(ExitCode::from(EXIT_CONFLICTS));
        }
        let lines = ConflictResolver::apply_all(&buffer.lines, &resolutions)?;
        (resolutions.len(), lines)
    } else {
        let line = line.context("--line is required without --all")?;
        let resolution =
            ConflictResolver::resolve_at_cursor(&buffer.lines, line, patterns, strategy)?;
        (1, resolution.apply(&buffer.lines)?)
    };

    info!(resolved, strategy = %strategy, "resolution applied");

    if !write {
        print!("{}", buffer.render(&new_lines));
        return Ok(ExitCode::SUCCESS);
    }

    buffer.write(&new_lines)?;
    debug!(path = %file.display(), "resolved buffer written");

    // Rescan: only an empty result means the file is fully resolved.
    let remaining = scan(&new_lines, patterns);
    if remaining.is_empty() {
        eprintln!("{}", style::success("All conflicts resolved"));
    } else {
        eprintln!(
            "{}",
            style::success(&format!(
                "Resolved {} conflict(s) with '{}'; {} remaining",
                resolved,
                strategy,
                remaining.len()
            ))
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_diff(
    file: &Path,
    line: usize,
    pairs: &[DiffPair],
    no_color: bool,
    config: &AppConfig,
    patterns: &MarkerPatternSet,
) -> Result<ExitCode> {
    if no_color || !config.diff.color {
        console::set_colors_enabled(false);
    }

    let buffer = Buffer::read(file)?;
    let plan = DiffPlanner::plan_at_cursor(
        &buffer.lines,
        line,
        patterns,
        pairs,
        &config.diff_labels(),
    )?;

    print!("{}", render::render_plan(&plan, config.diff.context_lines));
    Ok(ExitCode::SUCCESS)
}

async fn cmd_check(
    file: &Path,
    use_precheck: bool,
    config: &AppConfig,
    patterns: &MarkerPatternSet,
) -> Result<ExitCode> {
    let from_stdin = file == Path::new("-");

    if use_precheck {
        let verdict = precheck::verdict_for(file, &config.markers.ours).await;
        debug!(?verdict, "pre-check verdict");

        // Stdin never matches a file on disk, so it counts as modified.
        if !must_scan(verdict, from_stdin) {
            println!("{}", style::success(&format!("{}: clean", file.display())));
            return Ok(ExitCode::SUCCESS);
        }
    }

    let buffer = Buffer::read(file)?;
    let blocks = scan_in_background(&buffer, patterns).await?;

    if blocks.is_empty() {
        println!("{}", style::success(&format!("{}: clean", file.display())));
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{}",
            style::error(&format!("{}: {} conflict(s)", file.display(), blocks.len()))
        );
        Ok(ExitCode::from(EXIT_CONFLICTS))
    }
}

fn cmd_init(output: &Path) -> Result<ExitCode> {
    let default_config = r#"# conflictmark configuration
# Every section is optional; the values below are the built-in defaults.

[markers]
# Regular expressions, matched at the start of a line.
ours = '^<{3,}'
theirs = '^>{3,}'
ancestor = '^\|{3,}'
separator = '^={7,}$'

[labels]
ours = "Ours"
theirs = "Theirs"
base = "Base"

[diff]
context_lines = 3
color = true

[log]
level = "warn"
"#;

    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    std::fs::write(output, default_config).context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Adjust marker patterns or labels if your tools use a different style");
    println!(
        "  2. Validate with: conflictmark validate --config {}",
        output.display()
    );

    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(explicit: Option<&Path>) -> Result<ExitCode> {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(discover_config_path) else {
        println!("No configuration file found; built-in defaults are in effect.");
        return Ok(ExitCode::SUCCESS);
    };

    println!("Validating configuration: {}", path.display());
    println!();

    let mut config = AppConfig::load_from_file(&path).context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    config.resolve_env_overrides();
    println!("  [OK] Environment overrides processed");

    match config.validate() {
        Ok(()) => println!("  [OK] All values are valid"),
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    println!();
    println!("Configuration summary:");
    println!("  Ours marker     : {}", config.markers.ours);
    println!("  Theirs marker   : {}", config.markers.theirs);
    println!("  Ancestor marker : {}", config.markers.ancestor);
    println!("  Separator       : {}", config.markers.separator);
    println!(
        "  Labels          : {} / {} / {}",
        config.labels.ours, config.labels.theirs, config.labels.base
    );
    println!("  Diff context    : {} lines", config.diff.context_lines);
    println!(
        "  Diff color      : {}",
        if config.diff.color { "on" } else { "off" }
    );
    println!("  Log level       : {}", config.log.level);
    println!();
    println!("Configuration is valid.");

    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// Utilities
// ---------------------------------------------------------------------------

fn section_len(block: &ConflictBlock, section: Section) -> String {
    block
        .section_range(section)
        .map(|s| s.len().to_string())
        .unwrap_or_else(|| "-".to_string())
}
