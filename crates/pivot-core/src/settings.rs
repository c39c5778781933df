use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{PivotError, Result};
use crate::models::{OutputRange, PivotConfig};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Aggregate CSV rows into a pivot table
#[derive(Parser, Debug, Clone)]
#[command(
    name = "csv-pivot",
    about = "Aggregate CSV rows into a pivot table",
    version
)]
pub struct Settings {
    /// Input CSV file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output CSV file path
    #[arg(short, long, default_value = "output.csv")]
    pub output: PathBuf,

    /// Row dimension column index
    #[arg(short = 'r', long, alias = "rowDimension")]
    pub row_dimension: Option<usize>,

    /// Column dimension column index
    #[arg(short = 'c', long, alias = "columnDimension")]
    pub column_dimension: Option<usize>,

    /// Value dimension column index
    #[arg(short = 'v', long, alias = "valueDimension")]
    pub value_dimension: Option<usize>,

    /// Additional column indexes to be included, comma separated
    #[arg(short = 'e', long, alias = "extraColumns", value_delimiter = ',')]
    pub extra_columns: Vec<usize>,

    /// Include row totals in the output
    #[arg(long, alias = "rowTotals")]
    pub row_totals: bool,

    /// Skip rows with zero totals in the output
    #[arg(long, alias = "skipZeroTotals")]
    pub skip_zero_totals: bool,

    /// Include weekly totals in the output
    #[arg(long, alias = "weeklyTotals")]
    pub weekly_totals: bool,

    /// Include monthly totals in the output
    #[arg(long, alias = "monthlyTotals")]
    pub monthly_totals: bool,

    /// Omit the body of the pivot table and only include totals
    #[arg(long, alias = "omitBody")]
    pub omit_body: bool,

    /// Minimum row total for inclusion in the output
    #[arg(long, alias = "minRowTotal", allow_negative_numbers = true)]
    pub min_row_total: Option<f64>,

    /// Maximum row total for inclusion in the output
    #[arg(long, alias = "maxRowTotal", allow_negative_numbers = true)]
    pub max_row_total: Option<f64>,

    /// First output column to include (1-based)
    #[arg(
        long,
        alias = "outputRangeLower",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub output_range_lower: Option<usize>,

    /// Last output column to include (1-based, inclusive)
    #[arg(
        long,
        alias = "outputRangeUpper",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub output_range_upper: Option<usize>,

    /// Text file containing row keys to keep, one per line
    #[arg(short = 'm', long, alias = "matchList")]
    pub match_list: Option<PathBuf>,

    /// Field delimiter for input and output (detected from the input when omitted)
    #[arg(short = 'd', long)]
    pub delimiter: Option<char>,

    /// JSON profile supplying defaults for options not given on the command line
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Save the effective pivot options to this JSON profile
    #[arg(long)]
    pub save_profile: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── PivotProfile ───────────────────────────────────────────────────────────────

/// Reusable pivot options stored as JSON.
///
/// Every field is optional; absent fields leave the command-line default in
/// place.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct PivotProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_dimension: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_dimension: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_dimension: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_columns: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_totals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_zero_totals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_totals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_totals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omit_body: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_row_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_row_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_range_lower: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_range_upper: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_list: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
}

impl PivotProfile {
    /// Load a profile from `path`.
    ///
    /// Unlike optional state files, a profile named on the command line must
    /// exist and parse.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| PivotError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Atomically write the profile to `path`, creating parent directories
    /// if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let write_err = |source| PivotError::FileWrite {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(write_err)?;
        std::fs::rename(&tmp, path).map_err(write_err)?;

        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

/// Copy each listed profile field into `settings` unless the matching flag was
/// given on the command line.
macro_rules! merge_from_profile {
    ($settings:ident, $profile:ident, $matches:ident, $($field:ident),+ $(,)?) => {
        $(
            if !is_arg_explicitly_set($matches, stringify!($field)) {
                if let Some(v) = $profile.$field {
                    $settings.$field = v.into();
                }
            }
        )+
    };
}

impl Settings {
    /// Parse the process arguments and merge the `--profile`, if any.
    pub fn load() -> Result<Self> {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from_args(args: Vec<OsString>) -> Result<Self> {
        // Raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if let Some(path) = settings.profile.clone() {
            let profile = PivotProfile::load_from(&path)?;
            settings.merge_profile(profile, &matches);
        }

        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        Ok(settings)
    }

    /// Fill options not given on the command line from `profile`.
    fn merge_profile(&mut self, profile: PivotProfile, matches: &clap::ArgMatches) {
        let settings = self;
        merge_from_profile!(
            settings,
            profile,
            matches,
            output,
            row_dimension,
            column_dimension,
            value_dimension,
            extra_columns,
            row_totals,
            skip_zero_totals,
            weekly_totals,
            monthly_totals,
            omit_body,
            min_row_total,
            max_row_total,
            output_range_lower,
            output_range_upper,
            match_list,
            delimiter,
        );
    }

    /// Build the pivot configuration for this run.
    ///
    /// Fails when a dimension index was supplied neither on the command line
    /// nor by the profile.
    pub fn pivot_config(&self) -> Result<PivotConfig> {
        let required = |value: Option<usize>, flag: &str| {
            value.ok_or_else(|| PivotError::Config(format!("{} is required", flag)))
        };

        let row_dimension = required(self.row_dimension, "--row-dimension")?;
        let column_dimension = required(self.column_dimension, "--column-dimension")?;
        let value_dimension = required(self.value_dimension, "--value-dimension")?;

        if let (Some(min), Some(max)) = (self.min_row_total, self.max_row_total) {
            if min > max {
                warn!(
                    "min row total {} exceeds max row total {}; no rows can be included",
                    min, max
                );
            }
        }
        if let (Some(lower), Some(upper)) = (self.output_range_lower, self.output_range_upper) {
            if lower > upper {
                warn!(
                    "output range {}..{} is empty; no value columns will be written",
                    lower, upper
                );
            }
        }

        Ok(PivotConfig {
            row_dimension,
            column_dimension,
            value_dimension,
            extra_columns: self.extra_columns.clone(),
            include_row_totals: self.row_totals,
            skip_zero_totals: self.skip_zero_totals,
            include_weekly_totals: self.weekly_totals,
            include_monthly_totals: self.monthly_totals,
            omit_body: self.omit_body,
            min_row_total: self.min_row_total,
            max_row_total: self.max_row_total,
            output_range: OutputRange::new(self.output_range_lower, self.output_range_upper),
            match_list: self.match_list.clone(),
        })
    }

    /// The delimiter as a byte, if one was configured.
    pub fn delimiter_byte(&self) -> Result<Option<u8>> {
        match self.delimiter {
            None => Ok(None),
            Some(c) if c.is_ascii() => Ok(Some(c as u8)),
            Some(c) => Err(PivotError::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                c
            ))),
        }
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for PivotProfile {
    fn from(s: &Settings) -> Self {
        PivotProfile {
            output: Some(s.output.clone()),
            row_dimension: s.row_dimension,
            column_dimension: s.column_dimension,
            value_dimension: s.value_dimension,
            extra_columns: Some(s.extra_columns.clone()),
            row_totals: Some(s.row_totals),
            skip_zero_totals: Some(s.skip_zero_totals),
            weekly_totals: Some(s.weekly_totals),
            monthly_totals: Some(s.monthly_totals),
            omit_body: Some(s.omit_body),
            min_row_total: s.min_row_total,
            max_row_total: s.max_row_total,
            output_range_lower: s.output_range_lower,
            output_range_upper: s.output_range_upper,
            match_list: s.match_list.clone(),
            delimiter: s.delimiter,
        }
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
