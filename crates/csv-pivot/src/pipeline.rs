//! End-to-end run: read the input CSV, aggregate, render, write.

use std::time::{Duration, Instant};

use anyhow::Result;
use pivot_core::formatting::{format_count, format_elapsed};
use pivot_core::settings::{PivotProfile, Settings};
use pivot_data::aggregator::PivotAggregator;
use pivot_data::reader::read_rows;
use pivot_data::renderer::PivotRenderer;
use pivot_data::writer::write_table;
use tracing::{debug, info};

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Data rows read from the input, header excluded.
    pub rows_read: usize,
    /// Rows that contributed to the pivot.
    pub rows_aggregated: usize,
    /// Body rows written after total filtering.
    pub body_rows: usize,
    /// Cells in the header row.
    pub columns: usize,
    pub elapsed: Duration,
}

/// Run the pivot described by `settings`.
pub fn run(settings: &Settings) -> Result<RunSummary> {
    let config = settings.pivot_config()?;
    let delimiter = settings.delimiter_byte()?;

    info!("Input file: {}", settings.input.display());
    info!("Output file: {}", settings.output.display());

    let start = Instant::now();

    let rows = read_rows(&settings.input, delimiter)?;
    let model = PivotAggregator::build(&rows, &config);

    let mut last_decile = 0;
    let table = PivotRenderer::render_with_progress(&model, &config, |progress| {
        let decile = (progress.fraction() * 10.0).floor() as usize;
        if decile > last_decile {
            last_decile = decile;
            debug!(
                "Rendered {}/{} rows ({}%)",
                progress.processed,
                progress.total,
                decile * 10
            );
        }
    });

    write_table(&settings.output, &table, delimiter.unwrap_or(b','))?;

    if let Some(path) = &settings.save_profile {
        PivotProfile::from(settings).save_to(path)?;
        info!("Saved profile to {}", path.display());
    }

    let stats = model.stats();
    let elapsed = start.elapsed();
    info!(
        "Wrote {} rows x {} columns from {} input rows",
        format_count(table.body.len()),
        format_count(table.header.len()),
        format_count(stats.rows_read)
    );
    info!(
        "Pivot table created successfully. Time taken: {}.",
        format_elapsed(elapsed)
    );

    Ok(RunSummary {
        rows_read: stats.rows_read,
        rows_aggregated: stats.rows_aggregated,
        body_rows: table.body.len(),
        columns: table.header.len(),
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;
    use tempfile::TempDir;

    fn settings(tmp: &TempDir, input: &str, extra: &[&str]) -> Settings {
        let input_path = tmp.path().join("input.csv");
        std::fs::write(&input_path, input).unwrap();
        let output_path = tmp.path().join("output.csv");

        let mut args: Vec<String> = vec![
            "csv-pivot".into(),
            "-i".into(),
            path_str(&input_path),
            "-o".into(),
            path_str(&output_path),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        Settings::parse_from(args)
    }

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    fn output(tmp: &TempDir) -> String {
        std::fs::read_to_string(tmp.path().join("output.csv")).unwrap()
    }

    const SCENARIO_A: &str = "R,C,V\nA,x,10\nA,x,5\nB,y,3\n";

    #[test]
    fn test_run_scenario_a() {
        let tmp = TempDir::new().unwrap();
        let s = settings(&tmp, SCENARIO_A, &["-r", "0", "-c", "1", "-v", "2"]);

        let summary = run(&s).expect("run");

        assert_eq!(output(&tmp), "Row \\ Column,x,y\nA,15,\nB,,3\n");
        assert_eq!(summary.rows_read, 3);
        assert_eq!(summary.rows_aggregated, 3);
        assert_eq!(summary.body_rows, 2);
        assert_eq!(summary.columns, 3);
    }

    #[test]
    fn test_run_totals_and_bounds() {
        let tmp = TempDir::new().unwrap();
        let s = settings(
            &tmp,
            SCENARIO_A,
            &[
                "-r",
                "0",
                "-c",
                "1",
                "-v",
                "2",
                "--row-totals",
                "--min-row-total",
                "10",
            ],
        );

        run(&s).expect("run");

        assert_eq!(output(&tmp), "Row \\ Column,x,y,Row Total\nA,15,,15\n");
    }

    #[test]
    fn test_run_semicolon_input_with_extra_column() {
        let tmp = TempDir::new().unwrap();
        let input = "id;name;day;qty\n1;apple;2023-01-01;2\n1;apple;2023-01-01;3\n2;pear;2023-01-02;1\n";
        let s = settings(
            &tmp,
            input,
            &["-r", "0", "-c", "2", "-v", "3", "-e", "1", "--omit-body", "--row-totals"],
        );

        run(&s).expect("run");

        assert_eq!(
            output(&tmp),
            "Row \\ Column,Extra Col 1,Row Total\n1,apple,5\n2,pear,1\n"
        );
    }

    #[test]
    fn test_run_with_match_list_file() {
        let tmp = TempDir::new().unwrap();
        let keys = tmp.path().join("keys.txt");
        std::fs::write(&keys, "AAA\nBBB").unwrap();
        let input = "Row,Column,Value\nAAA,2023-01-01,10\nDDD,2023-01-02,15\nBBB,2023-01-01,20\n";
        let keys_arg = path_str(&keys);
        let s = settings(
            &tmp,
            input,
            &["-r", "0", "-c", "1", "-v", "2", "-m", keys_arg.as_str()],
        );

        let summary = run(&s).expect("run");

        assert_eq!(
            output(&tmp),
            "Row \\ Column,2023-01-01\nAAA,10\nBBB,20\n"
        );
        assert_eq!(summary.rows_aggregated, 2);
    }

    #[test]
    fn test_run_missing_match_list_still_succeeds() {
        let tmp = TempDir::new().unwrap();
        let missing = path_str(&tmp.path().join("nope.txt"));
        let s = settings(
            &tmp,
            SCENARIO_A,
            &["-r", "0", "-c", "1", "-v", "2", "-m", missing.as_str()],
        );

        let summary = run(&s).expect("run");
        assert_eq!(summary.body_rows, 2);
    }

    #[test]
    fn test_run_saves_profile() {
        let tmp = TempDir::new().unwrap();
        let profile_path = tmp.path().join("profile.json");
        let profile_arg = path_str(&profile_path);
        let s = settings(
            &tmp,
            SCENARIO_A,
            &[
                "-r",
                "0",
                "-c",
                "1",
                "-v",
                "2",
                "--weekly-totals",
                "--save-profile",
                profile_arg.as_str(),
            ],
        );

        run(&s).expect("run");

        let profile = PivotProfile::load_from(&profile_path).expect("profile");
        assert_eq!(profile.row_dimension, Some(0));
        assert_eq!(profile.weekly_totals, Some(true));
    }

    #[test]
    fn test_run_missing_dimension_fails_before_reading() {
        let tmp = TempDir::new().unwrap();
        let s = settings(&tmp, SCENARIO_A, &["-r", "0", "-c", "1"]);

        let err = run(&s).unwrap_err();

        assert!(err.to_string().contains("--value-dimension"));
        assert!(!tmp.path().join("output.csv").exists());
    }

    #[test]
    fn test_run_missing_input_fails() {
        let tmp = TempDir::new().unwrap();
        let mut s = settings(&tmp, SCENARIO_A, &["-r", "0", "-c", "1", "-v", "2"]);
        s.input = tmp.path().join("absent.csv");

        let err = run(&s).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
