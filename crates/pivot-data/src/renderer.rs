//! Rendering of a [`PivotModel`] into a header row and body rows.

use pivot_core::models::{Cell, PivotConfig, PivotTable};
use pivot_core::time_utils::{month_label, week_label, MONTH_NAMES, WEEKS_IN_OUTPUT};

use crate::aggregator::PivotModel;

/// Label of the top-left header cell.
pub const CORNER_LABEL: &str = "Row \\ Column";
pub const ROW_TOTAL_LABEL: &str = "Row Total";

/// How far rendering has progressed, reported once per row key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProgress {
    pub processed: usize,
    pub total: usize,
}

impl RenderProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.processed as f64 / self.total as f64
    }
}

/// Stateless renderer for aggregated pivot models.
pub struct PivotRenderer;

impl PivotRenderer {
    /// Render `model` into a table.
    pub fn render(model: &PivotModel, config: &PivotConfig) -> PivotTable {
        Self::render_with_progress(model, config, |_| {})
    }

    /// Render `model`, calling `on_progress` after each row key.
    ///
    /// Rows whose total fails the min/max or zero-total tests are left out of
    /// the body.
    pub fn render_with_progress(
        model: &PivotModel,
        config: &PivotConfig,
        mut on_progress: impl FnMut(RenderProgress),
    ) -> PivotTable {
        let header = Self::header(model, config);
        let visible = visible_columns(model, config);
        let total = model.row_count();
        let mut body = Vec::new();

        for (i, row_key) in model.row_keys().enumerate() {
            if let Some(row) = Self::body_row(model, config, row_key, &visible) {
                body.push(row);
            }
            on_progress(RenderProgress {
                processed: i + 1,
                total,
            });
        }

        PivotTable { header, body }
    }

    /// Build the header row.
    pub fn header(model: &PivotModel, config: &PivotConfig) -> Vec<Cell> {
        let mut header = vec![Cell::text(CORNER_LABEL)];
        header.extend(
            config
                .extra_columns
                .iter()
                .map(|idx| Cell::Text(format!("Extra Col {}", idx))),
        );
        if !config.omit_body {
            header.extend(visible_columns(model, config).into_iter().map(Cell::text));
        }
        if config.include_row_totals {
            header.push(Cell::text(ROW_TOTAL_LABEL));
        }
        if config.include_weekly_totals {
            header.extend((1..=WEEKS_IN_OUTPUT).map(|week| Cell::Text(week_label(week))));
        }
        if config.include_monthly_totals {
            header.extend(
                (1..=MONTH_NAMES.len() as u32)
                    .filter_map(month_label)
                    .map(Cell::Text),
            );
        }
        header
    }

    /// Build the body row for `row_key`, or `None` when its total is
    /// filtered out.
    ///
    /// Every sum that exists is rendered, including one that nets to zero;
    /// only cells and periods with no contributing rows are left empty.
    fn body_row(
        model: &PivotModel,
        config: &PivotConfig,
        row_key: &str,
        visible: &[&str],
    ) -> Option<Vec<Cell>> {
        let row_total = model.row_total(row_key);
        if !config.admits_total(row_total) {
            return None;
        }

        let mut row = vec![Cell::text(row_key)];
        if let Some(extra) = model.extra(row_key) {
            row.extend(
                extra
                    .iter()
                    .map(|value| value.as_deref().map_or(Cell::Empty, Cell::text)),
            );
        }
        if !config.omit_body {
            row.extend(
                visible
                    .iter()
                    .map(|column| Cell::from(model.cell(row_key, column))),
            );
        }
        if config.include_row_totals {
            row.push(Cell::Number(row_total));
        }
        if config.include_weekly_totals {
            row.extend((1..=WEEKS_IN_OUTPUT).map(|week| Cell::from(model.weekly(week, row_key))));
        }
        if config.include_monthly_totals {
            row.extend(
                (1..=MONTH_NAMES.len() as u32).map(|month| Cell::from(model.monthly(month, row_key))),
            );
        }
        Some(row)
    }
}

/// Sorted column keys restricted to the configured output window.
fn visible_columns<'a>(model: &'a PivotModel, config: &PivotConfig) -> Vec<&'a str> {
    let window = config.output_range.window(model.column_count());
    model
        .column_keys()
        .skip(window.start)
        .take(window.len())
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
