mod bootstrap;

use anyhow::{Context, Result};
use cycle_core::diff;
use cycle_core::settings::Settings;
use cycle_data::analysis::analyze_cycles;
use cycle_data::reader::PayloadPaths;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("cycle-compare v{} starting", env!("CARGO_PKG_VERSION"));

    let data_dir = settings.data_dir.clone().or_else(bootstrap::discover_data_dir);
    let paths = PayloadPaths::resolve(
        settings.usage.as_deref(),
        settings.metadata.as_deref(),
        settings.vacation.as_deref(),
        data_dir.as_deref(),
    )?;
    let options = settings.normalize_options()?;

    let analysis = analyze_cycles(&paths, &options)
        .with_context(|| format!("normalizing {}", paths.usage.display()))?;
    tracing::info!(
        "Normalized {} cycles ({} holidays, {} vacation days) in {:.3}s",
        analysis.metadata.records_processed,
        analysis.metadata.holidays,
        analysis.metadata.vacation_days,
        analysis.metadata.load_time_seconds + analysis.metadata.normalize_time_seconds
    );

    match settings.view.as_str() {
        "list" => {
            println!("{}", serde_json::to_string_pretty(&analysis.batch)?);
        }
        "diff" => {
            let (first, second) = settings.diff_indices()?;
            let delta = diff::compare(&analysis.batch, first, second)?;
            println!("{}", serde_json::to_string_pretty(&delta)?);
        }
        unknown => anyhow::bail!("Unknown view mode: {}", unknown),
    }

    Ok(())
}
