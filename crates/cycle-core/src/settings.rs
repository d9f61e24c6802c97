use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::builder::NormalizeOptions;
use crate::error::{CycleError, Result};
use crate::itemization::ItemizationConfig;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Normalize utility billing cycles and compare two of them
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cycle-compare",
    about = "Normalize utility billing cycles and compare two of them",
    version
)]
pub struct Settings {
    /// Usage payload (JSON)
    #[arg(long)]
    pub usage: Option<PathBuf>,

    /// Account metadata payload (JSON)
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Vacation payload (JSON)
    #[arg(long)]
    pub vacation: Option<PathBuf>,

    /// Directory holding usage.json, metadata.json and vacation.json
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Output view
    #[arg(long, default_value = "list", value_parser = ["list", "diff"])]
    pub view: String,

    /// First cycle to compare (1-based)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub first: Option<u32>,

    /// Second cycle to compare (1-based)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub second: Option<u32>,

    /// Keep cooking, laundry, other and refrigeration as separate categories
    #[arg(long)]
    pub no_combine: bool,

    /// Count weekday substitutes of weekend holidays
    #[arg(long)]
    pub include_observed: bool,

    /// First year of the holiday calendar
    #[arg(long, default_value = "2016")]
    pub from_year: i32,

    /// Last year of the holiday calendar
    #[arg(long, default_value = "2025")]
    pub to_year: i32,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.cycle-compare/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vacation: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combine: Option<bool>,
}

impl LastUsedParams {
    /// Default location: `~/.cycle-compare/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".cycle-compare").join("last_used.json")
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Write via a temp file and rename, creating parent directories.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    pub fn clear() -> Result<()> {
        Self::clear_at(&Self::config_path())
    }

    pub fn clear_at(path: &std::path::Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and fill unset payload paths and the combine flag
    /// from the last run, then persist the merged values.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("could not clear {}: {e}", config_path.display());
            }
            return settings.apply_debug();
        }

        let last = LastUsedParams::load_from(config_path);

        // Explicit payload paths replace the whole remembered set, so a
        // --data-dir from an earlier run never shadows a fresh --usage.
        let any_source_given = ["usage", "metadata", "vacation", "data_dir"]
            .iter()
            .any(|name| is_arg_explicitly_set(&matches, name));
        if !any_source_given {
            settings.usage = last.usage;
            settings.metadata = last.metadata;
            settings.vacation = last.vacation;
            settings.data_dir = last.data_dir;
        }
        if !is_arg_explicitly_set(&matches, "no_combine") {
            if let Some(combine) = last.combine {
                settings.no_combine = !combine;
            }
        }

        settings = settings.apply_debug();

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!("could not persist {}: {e}", config_path.display());
        }

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    /// Build the pipeline options these flags describe.
    pub fn normalize_options(&self) -> Result<NormalizeOptions> {
        if self.from_year > self.to_year {
            return Err(CycleError::Config(format!(
                "--from-year {} is after --to-year {}",
                self.from_year, self.to_year
            )));
        }
        let itemization = if self.no_combine {
            ItemizationConfig::default().without_combination()
        } else {
            ItemizationConfig::default()
        };
        Ok(NormalizeOptions {
            holiday_years: self.from_year..=self.to_year,
            exclude_observed: !self.include_observed,
            itemization,
        })
    }

    /// The 0-based pair requested for the diff view.
    pub fn diff_indices(&self) -> Result<(usize, usize)> {
        match (self.first, self.second) {
            (Some(first), Some(second)) => Ok((first as usize - 1, second as usize - 1)),
            _ => Err(CycleError::Config(
                "the diff view needs both --first and --second".to_string(),
            )),
        }
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            usage: s.usage.clone(),
            metadata: s.metadata.clone(),
            vacation: s.vacation.clone(),
            data_dir: s.data_dir.clone(),
            combine: Some(!s.no_combine),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
