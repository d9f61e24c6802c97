//! Payload discovery and loading.
//!
//! Each user contributes three JSON documents: the usage chart list, the
//! account metadata (location) and the per-cycle vacation entries.

use std::path::{Path, PathBuf};

use cycle_core::error::{CycleError, Result};
use serde_json::Value;
use tracing::debug;

pub const USAGE_FILE: &str = "usage.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const VACATION_FILE: &str = "vacation.json";

// ── Paths ─────────────────────────────────────────────────────────────────────

/// Where the three payloads of one user live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPaths {
    pub usage: PathBuf,
    pub metadata: PathBuf,
    pub vacation: PathBuf,
}

impl PayloadPaths {
    /// The conventional file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            usage: dir.join(USAGE_FILE),
            metadata: dir.join(METADATA_FILE),
            vacation: dir.join(VACATION_FILE),
        }
    }

    /// Combine explicit paths with a fallback directory.
    ///
    /// An explicit path always wins; a missing one is taken from `data_dir`.
    pub fn resolve(
        usage: Option<&Path>,
        metadata: Option<&Path>,
        vacation: Option<&Path>,
        data_dir: Option<&Path>,
    ) -> Result<Self> {
        let defaults = data_dir.map(Self::in_dir);
        let pick = |explicit: Option<&Path>, fallback: Option<&PathBuf>, flag: &str| {
            explicit
                .map(Path::to_path_buf)
                .or_else(|| fallback.cloned())
                .ok_or_else(|| {
                    CycleError::Config(format!("no {flag} payload given and no --data-dir"))
                })
        };
        Ok(Self {
            usage: pick(usage, defaults.as_ref().map(|d| &d.usage), "--usage")?,
            metadata: pick(metadata, defaults.as_ref().map(|d| &d.metadata), "--metadata")?,
            vacation: pick(vacation, defaults.as_ref().map(|d| &d.vacation), "--vacation")?,
        })
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Parsed payload documents of one user.
#[derive(Debug, Clone)]
pub struct RawPayloads {
    pub usage: Value,
    pub metadata: Value,
    pub vacation: Value,
}

/// Read and parse one JSON document.
pub fn load_payload(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| CycleError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&content)?;
    debug!("Loaded {} ({} bytes)", path.display(), content.len());
    Ok(value)
}

/// Read all three payloads; the first unreadable file aborts.
pub fn load_payloads(paths: &PayloadPaths) -> Result<RawPayloads> {
    Ok(RawPayloads {
        usage: load_payload(&paths.usage)?,
        metadata: load_payload(&paths.metadata)?,
        vacation: load_payload(&paths.vacation)?,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
