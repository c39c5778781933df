use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::formatting::format_value;

// ── OutputRange ───────────────────────────────────────────────────────────────

/// A 1-based, inclusive window over the sorted column keys.
///
/// Both bounds are optional: `lower` defaults to the first column and `upper`
/// to the last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRange {
    pub lower: Option<usize>,
    pub upper: Option<usize>,
}

impl OutputRange {
    pub fn new(lower: Option<usize>, upper: Option<usize>) -> Self {
        Self { lower, upper }
    }

    /// Convert the window to a half-open index range over `column_count`
    /// columns.
    ///
    /// Out-of-range bounds are clamped; an inverted or empty window yields an
    /// empty range.
    ///
    /// # Examples
    ///
    /// ```
    /// use pivot_core::models::OutputRange;
    ///
    /// assert_eq!(OutputRange::new(Some(2), Some(3)).window(5), 1..3);
    /// assert_eq!(OutputRange::new(None, Some(9)).window(4), 0..4);
    /// assert!(OutputRange::new(Some(7), None).window(4).is_empty());
    /// ```
    pub fn window(&self, column_count: usize) -> Range<usize> {
        let start = self.lower.unwrap_or(1).saturating_sub(1);
        let end = self.upper.unwrap_or(column_count).min(column_count);
        if start >= end {
            return 0..0;
        }
        start..end
    }

    /// Number of columns the window admits out of `column_count`.
    pub fn width(&self, column_count: usize) -> usize {
        self.window(column_count).len()
    }
}

// ── PivotConfig ───────────────────────────────────────────────────────────────

/// Immutable configuration for a single pivot run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotConfig {
    /// Source column supplying row labels.
    pub row_dimension: usize,
    /// Source column supplying column labels.
    pub column_dimension: usize,
    /// Source column supplying the summed values.
    pub value_dimension: usize,
    /// Source columns copied next to each row label.
    #[serde(default)]
    pub extra_columns: Vec<usize>,
    #[serde(default)]
    pub include_row_totals: bool,
    #[serde(default)]
    pub skip_zero_totals: bool,
    #[serde(default)]
    pub include_weekly_totals: bool,
    #[serde(default)]
    pub include_monthly_totals: bool,
    /// Drop the per-column cells, keeping only labels and totals.
    #[serde(default)]
    pub omit_body: bool,
    #[serde(default)]
    pub min_row_total: Option<f64>,
    #[serde(default)]
    pub max_row_total: Option<f64>,
    #[serde(default)]
    pub output_range: OutputRange,
    /// Text file with one allowed row key per line.
    #[serde(default)]
    pub match_list: Option<std::path::PathBuf>,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            row_dimension: 0,
            column_dimension: 1,
            value_dimension: 2,
            extra_columns: Vec::new(),
            include_row_totals: false,
            skip_zero_totals: false,
            include_weekly_totals: false,
            include_monthly_totals: false,
            omit_body: false,
            min_row_total: None,
            max_row_total: None,
            output_range: OutputRange::default(),
            match_list: None,
        }
    }
}

impl PivotConfig {
    /// Whether the column dimension must be parsed as a date.
    pub fn needs_periods(&self) -> bool {
        self.include_weekly_totals || self.include_monthly_totals
    }

    /// Whether a row total passes both the min/max bounds and the
    /// zero-total test.
    pub fn admits_total(&self, total: f64) -> bool {
        let within_range = self.min_row_total.map_or(true, |min| total >= min)
            && self.max_row_total.map_or(true, |max| total <= max);
        let non_zero = !self.skip_zero_totals || total != 0.0;
        within_range && non_zero
    }
}

// ── Cell ──────────────────────────────────────────────────────────────────────

/// One value of the rendered table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => f.write_str(&format_value(*n)),
            Cell::Empty => Ok(()),
        }
    }
}

// ── PivotTable ────────────────────────────────────────────────────────────────

/// A rendered pivot table: one header row followed by the body rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotTable {
    pub header: Vec<Cell>,
    pub body: Vec<Vec<Cell>>,
}

impl PivotTable {
    /// Find the body row whose first cell is `row_key`.
    pub fn row(&self, row_key: &str) -> Option<&[Cell]> {
        self.body
            .iter()
            .find(|row| matches!(row.first(), Some(Cell::Text(k)) if k == row_key))
            .map(Vec::as_slice)
    }

    /// Render every row as display strings, header first.
    pub fn to_string_rows(&self) -> Vec<Vec<String>> {
        std::iter::once(&self.header)
            .chain(self.body.iter())
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
