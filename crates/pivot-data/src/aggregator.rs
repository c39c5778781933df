//! Pivot aggregation: a single forward pass that sums values into
//! (row key, column key) cells and optional weekly/monthly buckets.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use pivot_core::models::PivotConfig;
use pivot_core::time_utils::{month_number, parse_date, week_number};
use tracing::{debug, warn};

use crate::match_list::MatchList;

// ── AggregateStats ────────────────────────────────────────────────────────────

/// Counters describing what happened to each raw data row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Data rows seen, header excluded.
    pub rows_read: usize,
    /// Rows that contributed to the model.
    pub rows_aggregated: usize,
    /// Rows dropped because their key is not in the match list.
    pub rows_not_matched: usize,
    /// Rows dropped because the value cell is not a finite number.
    pub rows_non_numeric: usize,
    /// Rows dropped because the row or column cell is missing.
    pub rows_missing_cells: usize,
    /// Aggregated rows whose column cell is not a date; they are absent from
    /// weekly and monthly sums.
    pub rows_without_date: usize,
}

// ── RowAggregate ──────────────────────────────────────────────────────────────

/// Everything accumulated for one row key.
#[derive(Debug, Clone, Default)]
pub struct RowAggregate {
    cells: HashMap<String, f64>,
    weekly: BTreeMap<i32, f64>,
    monthly: BTreeMap<u32, f64>,
    extra: Option<Vec<Option<String>>>,
}

impl RowAggregate {
    fn new(extra: Option<Vec<Option<String>>>) -> Self {
        Self {
            extra,
            ..Default::default()
        }
    }

    fn add_value(&mut self, column_key: &str, value: f64) {
        match self.cells.get_mut(column_key) {
            Some(sum) => *sum += value,
            None => {
                self.cells.insert(column_key.to_string(), value);
            }
        }
    }

    fn add_period(&mut self, week: Option<i32>, month: Option<u32>, value: f64) {
        if let Some(week) = week {
            *self.weekly.entry(week).or_insert(0.0) += value;
        }
        if let Some(month) = month {
            *self.monthly.entry(month).or_insert(0.0) += value;
        }
    }

    /// Sum for `column_key`, if any row contributed to it.
    pub fn cell(&self, column_key: &str) -> Option<f64> {
        self.cells.get(column_key).copied()
    }

    pub fn weekly(&self, week: i32) -> Option<f64> {
        self.weekly.get(&week).copied()
    }

    pub fn monthly(&self, month: u32) -> Option<f64> {
        self.monthly.get(&month).copied()
    }

    /// Extra-column values captured from the first row with this key.
    pub fn extra(&self) -> Option<&[Option<String>]> {
        self.extra.as_deref()
    }
}

// ── PivotModel ────────────────────────────────────────────────────────────────

/// The aggregated pivot: distinct row and column keys plus every sum.
///
/// Row keys own their aggregates, so every key with a cell, period sum or
/// snapshot is by construction a member of the row-key set.
#[derive(Debug, Clone, Default)]
pub struct PivotModel {
    rows: BTreeMap<String, RowAggregate>,
    columns: BTreeSet<String>,
    stats: AggregateStats,
}

impl PivotModel {
    /// Row keys in ascending lexicographic order.
    pub fn row_keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Column keys in ascending lexicographic order.
    pub fn column_keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, row_key: &str) -> Option<&RowAggregate> {
        self.rows.get(row_key)
    }

    pub fn cell(&self, row_key: &str, column_key: &str) -> Option<f64> {
        self.row(row_key)?.cell(column_key)
    }

    pub fn weekly(&self, week: i32, row_key: &str) -> Option<f64> {
        self.row(row_key)?.weekly(week)
    }

    pub fn monthly(&self, month: u32, row_key: &str) -> Option<f64> {
        self.row(row_key)?.monthly(month)
    }

    pub fn extra(&self, row_key: &str) -> Option<&[Option<String>]> {
        self.row(row_key)?.extra()
    }

    /// Sum of every cell of `row_key` across all column keys.
    pub fn row_total(&self, row_key: &str) -> f64 {
        let Some(aggregate) = self.row(row_key) else {
            return 0.0;
        };
        self.columns
            .iter()
            .filter_map(|column| aggregate.cell(column))
            .sum()
    }

    pub fn stats(&self) -> AggregateStats {
        self.stats
    }

    /// Fold one raw data row into the model.
    fn add_row<S: AsRef<str>>(
        &mut self,
        row: &[S],
        config: &PivotConfig,
        match_list: Option<&MatchList>,
    ) {
        self.stats.rows_read += 1;

        let (Some(row_key), Some(column_key)) = (
            cell(row, config.row_dimension),
            cell(row, config.column_dimension),
        ) else {
            self.stats.rows_missing_cells += 1;
            return;
        };

        if match_list.is_some_and(|list| !list.contains(row_key)) {
            self.stats.rows_not_matched += 1;
            return;
        }

        let Some(value) = cell(row, config.value_dimension).and_then(parse_value) else {
            self.stats.rows_non_numeric += 1;
            return;
        };

        if !self.columns.contains(column_key) {
            self.columns.insert(column_key.to_string());
        }

        let aggregate = self
            .rows
            .entry(row_key.to_string())
            .or_insert_with(|| RowAggregate::new(snapshot(row, &config.extra_columns)));
        aggregate.add_value(column_key, value);

        if config.needs_periods() {
            match parse_date(column_key) {
                Some(date) => aggregate.add_period(
                    config.include_weekly_totals.then(|| week_number(date)),
                    config.include_monthly_totals.then(|| month_number(date)),
                    value,
                ),
                None => self.stats.rows_without_date += 1,
            }
        }

        self.stats.rows_aggregated += 1;
    }
}

// ── PivotAggregator ───────────────────────────────────────────────────────────

/// Stateless builder that turns raw rows into a [`PivotModel`].
pub struct PivotAggregator;

impl PivotAggregator {
    /// Aggregate `rows` (the first row is the header and is skipped).
    ///
    /// When `config.match_list` is set the list is loaded first. A list that
    /// cannot be read is reported with a warning and the run continues
    /// without row filtering.
    pub fn build<S: AsRef<str>>(rows: &[Vec<S>], config: &PivotConfig) -> PivotModel {
        let match_list = config
            .match_list
            .as_deref()
            .and_then(|path| match MatchList::load(path) {
                Ok(list) => Some(list),
                Err(e) => {
                    warn!("{}; continuing without match-list filtering", e);
                    None
                }
            });

        Self::build_with_match_list(rows, config, match_list.as_ref())
    }

    /// Aggregate `rows` using an already-loaded match list.
    pub fn build_with_match_list<S: AsRef<str>>(
        rows: &[Vec<S>],
        config: &PivotConfig,
        match_list: Option<&MatchList>,
    ) -> PivotModel {
        let mut model = PivotModel::default();
        for row in rows.iter().skip(1) {
            model.add_row(row, config, match_list);
        }

        let stats = model.stats;
        debug!(
            "Aggregated {} of {} rows into {} row keys x {} column keys",
            stats.rows_aggregated,
            stats.rows_read,
            model.row_count(),
            model.column_count()
        );
        if stats.rows_non_numeric + stats.rows_missing_cells + stats.rows_not_matched > 0 {
            debug!(
                "Excluded rows: {} non-numeric, {} short, {} not in match list",
                stats.rows_non_numeric, stats.rows_missing_cells, stats.rows_not_matched
            );
        }
        if stats.rows_without_date > 0 {
            debug!(
                "{} rows had no parseable date and were left out of period totals",
                stats.rows_without_date
            );
        }

        model
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Cell `idx` of `row`, or `None` past the end of a short row.
fn cell<S: AsRef<str>>(row: &[S], idx: usize) -> Option<&str> {
    row.get(idx).map(AsRef::as_ref)
}

/// Parse a value cell; non-finite numbers are treated as non-numeric.
fn parse_value(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn snapshot<S: AsRef<str>>(row: &[S], extra_columns: &[usize]) -> Option<Vec<Option<String>>> {
    if extra_columns.is_empty() {
        return None;
    }
    Some(
        extra_columns
            .iter()
            .map(|&idx| cell(row, idx).map(str::to_string))
            .collect(),
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
