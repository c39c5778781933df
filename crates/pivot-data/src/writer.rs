//! CSV encoding of rendered pivot tables.

use std::io;
use std::path::Path;

use pivot_core::models::{Cell, PivotTable};
use pivot_core::{PivotError, Result};

/// Write `table` as CSV to `out`, header first.
///
/// Rows may differ in length.
pub fn write_table_to<W: io::Write>(out: W, table: &PivotTable, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_writer(out);

    writer.write_record(table.header.iter().map(cell_field))?;
    for row in &table.body {
        writer.write_record(row.iter().map(cell_field))?;
    }
    writer.flush()?;
    Ok(())
}

/// Create (or truncate) the file at `path` and write `table` to it.
pub fn write_table(path: &Path, table: &PivotTable, delimiter: u8) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|source| PivotError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    write_table_to(io::BufWriter::new(file), table, delimiter)
}

fn cell_field(cell: &Cell) -> String {
    cell.to_string()
}
