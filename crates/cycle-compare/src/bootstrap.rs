use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use cycle_data::reader::USAGE_FILE;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.cycle-compare/` and `~/.cycle-compare/logs/` exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    ensure_directories_in(&home())
}

pub fn ensure_directories_in(home: &Path) -> anyhow::Result<()> {
    let app_dir = home.join(".cycle-compare");
    std::fs::create_dir_all(&app_dir)?;
    std::fs::create_dir_all(app_dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map the CLI level names onto an `EnvFilter` directive.
fn filter_directive(log_level: &str) -> &'static str {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug",
        "WARNING" => "warn",
        "ERROR" | "CRITICAL" => "error",
        _ => "info",
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Logs go to `log_file` when given (appended, no ANSI colours) and to
/// stderr otherwise. Stdout is reserved for JSON output.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(fmt::layer().with_target(false).with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()?;
        }
        None => {
            registry
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}

// ── Data-dir discovery ─────────────────────────────────────────────────────────

/// Locate a directory holding `usage.json` when none was given.
///
/// Checks `~/.cycle-compare/data/` then `~/.config/cycle-compare/data/`.
pub fn discover_data_dir() -> Option<PathBuf> {
    discover_data_dir_in(&home())
}

pub fn discover_data_dir_in(home: &Path) -> Option<PathBuf> {
    let candidates = [
        home.join(".cycle-compare").join("data"),
        home.join(".config").join("cycle-compare").join("data"),
    ];
    candidates.into_iter().find(|p| p.join(USAGE_FILE).is_file())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
