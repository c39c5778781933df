mod bootstrap;
mod pipeline;

use anyhow::Result;
use pivot_core::settings::Settings;

fn main() -> Result<()> {
    let settings = Settings::load()?;

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("csv-pivot v{} starting", env!("CARGO_PKG_VERSION"));

    let summary = pipeline::run(&settings)?;
    tracing::debug!(
        "{} of {} rows aggregated into {} body rows x {} columns in {:?}",
        summary.rows_aggregated,
        summary.rows_read,
        summary.body_rows,
        summary.columns,
        summary.elapsed
    );

    Ok(())
}
