//! CSV decoding for pivot input files.
//!
//! Rows are returned as plain string cells; the first row is kept so the
//! aggregator can skip it as the header.

use std::path::Path;

use pivot_core::{PivotError, Result};
use tracing::debug;

/// Delimiters considered when none is configured, in tie-break order.
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b'\t', b'|', b';'];

/// Guess the field delimiter from the first non-empty line of `sample`.
///
/// Picks the candidate that occurs most often; falls back to `,`.
///
/// # Examples
///
/// ```
/// use pivot_data::reader::sniff_delimiter;
///
/// assert_eq!(sniff_delimiter("a;b;c\n1;2;3"), b';');
/// assert_eq!(sniff_delimiter("a\tb\n"), b'\t');
/// assert_eq!(sniff_delimiter("single"), b',');
/// ```
pub fn sniff_delimiter(sample: &str) -> u8 {
    let Some(line) = sample.lines().find(|l| !l.trim().is_empty()) else {
        return b',';
    };

    let mut best = (b',', 0usize);
    for candidate in CANDIDATE_DELIMITERS {
        let count = line.bytes().filter(|&b| b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Decode CSV `text` into rows of string cells.
///
/// Rows may have differing lengths and blank lines are skipped. When
/// `delimiter` is `None` it is sniffed from the text.
pub fn parse_rows(text: &str, delimiter: Option<u8>) -> Result<Vec<Vec<String>>> {
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(text));
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(
        "Parsed {} rows with delimiter {:?}",
        rows.len(),
        delimiter as char
    );
    Ok(rows)
}

/// Read and decode the CSV file at `path`.
pub fn read_rows(path: &Path, delimiter: Option<u8>) -> Result<Vec<Vec<String>>> {
    let text = std::fs::read_to_string(path).map_err(|source| PivotError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    // Drop a UTF-8 byte-order mark so it does not leak into the first cell.
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    parse_rows(text, delimiter)
}
