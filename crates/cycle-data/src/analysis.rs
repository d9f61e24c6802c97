//! Normalization pipeline over payloads on disk.
//!
//! Loads the three payloads of one user, normalizes them and reports what
//! was processed alongside the canonical batch.

use chrono::Utc;
use cycle_core::builder::{normalize, NormalizeOptions};
use cycle_core::error::Result;
use cycle_core::models::NormalizedBatch;
use tracing::debug;

use crate::reader::{load_payloads, PayloadPaths, RawPayloads};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the normalized batch.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Number of raw usage records normalized.
    pub records_processed: usize,
    /// Vacation days falling inside any cycle, summed over cycles.
    pub vacation_days: usize,
    /// Holidays falling inside any cycle, summed over cycles.
    pub holidays: usize,
    /// Wall-clock seconds spent reading the payload files.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent normalizing.
    pub normalize_time_seconds: f64,
}

/// The complete output of [`analyze_cycles`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub batch: NormalizedBatch,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Load the payloads at `paths` and normalize them.
pub fn analyze_cycles(paths: &PayloadPaths, options: &NormalizeOptions) -> Result<AnalysisResult> {
    let load_start = std::time::Instant::now();
    let payloads = load_payloads(paths)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let mut result = analyze_payloads(&payloads, options)?;
    result.metadata.load_time_seconds = load_time;
    Ok(result)
}

/// Normalize payloads that are already in memory.
pub fn analyze_payloads(payloads: &RawPayloads, options: &NormalizeOptions) -> Result<AnalysisResult> {
    let start = std::time::Instant::now();
    let batch = normalize(&payloads.usage, &payloads.metadata, &payloads.vacation, options)?;
    let normalize_time = start.elapsed().as_secs_f64();

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        records_processed: batch.cycles.len(),
        vacation_days: batch.cycles.iter().map(|c| c.num_vacation).sum(),
        holidays: batch.cycles.iter().map(|c| c.num_holidays).sum(),
        load_time_seconds: 0.0,
        normalize_time_seconds: normalize_time,
    };
    debug!(
        "Normalized {} cycles in {:.3}s ({} holidays, {} vacation days)",
        metadata.records_processed, normalize_time, metadata.holidays, metadata.vacation_days
    );

    Ok(AnalysisResult { batch, metadata })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
