// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV tokenizing into header-keyed rows.
//!
//! Spreadsheet exports are usually `;`-separated with a UTF-8 byte order
//! mark, but `,` files show up too. Quoted cells may contain the delimiter.

use crate::error::ImportError;
use csv::StringRecord;
use licenca_domain::FieldRow;

/// Picks `;` or `,` by counting unquoted occurrences in the header line.
#[must_use]
pub fn detect_delimiter(content: &str) -> u8 {
    let header_line: &str = strip_bom(content).lines().next().unwrap_or_default();

    let (mut semicolons, mut commas, mut quoted) = (0_usize, 0_usize, false);
    for c in header_line.chars() {
        match c {
            '"' => quoted = !quoted,
            ';' if !quoted => semicolons += 1,
            ',' if !quoted => commas += 1,
            _ => {}
        }
    }

    if semicolons > commas { b';' } else { b',' }
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

fn csv_reader(content: &str, delimiter: u8, has_headers: bool) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes())
}

fn row_from_record(headers: &StringRecord, record: &StringRecord) -> FieldRow {
    FieldRow::new(headers.iter().zip(record.iter()))
}

/// Builds a row whose values are the headers themselves, so alias lookups
/// can tell whether a column exists before any data is read.
#[must_use]
pub fn header_row(headers: &StringRecord) -> FieldRow {
    FieldRow::new(headers.iter().map(|h| (h, h)))
}

/// Tokenizes a single CSV line against known headers.
///
/// Cells beyond the header count are dropped; missing trailing cells are
/// absent from the row.
///
/// # Errors
///
/// Returns `ImportError::InvalidCsvFormat` if the line cannot be tokenized.
pub fn parse_csv_line(
    line: &str,
    headers: &[&str],
    delimiter: u8,
) -> Result<FieldRow, ImportError> {
    let mut reader = csv_reader(line, delimiter, false);
    let record: StringRecord = reader
        .records()
        .next()
        .transpose()
        .map_err(|e| ImportError::InvalidCsvFormat {
            reason: format!("Failed to read line: {e}"),
        })?
        .unwrap_or_default();

    Ok(FieldRow::new(headers.iter().copied().zip(record.iter())))
}

/// Headers and rows of a CSV document.
#[derive(Debug, Clone)]
pub struct CsvTable {
    /// The header record.
    pub headers: StringRecord,
    /// Non-blank data rows in file order.
    pub rows: Vec<FieldRow>,
}

/// Reads a whole CSV document. Blank rows are skipped.
///
/// # Arguments
///
/// * `content` - The raw CSV text
/// * `delimiter` - The field delimiter, or `None` to detect it
///
/// # Errors
///
/// Returns `ImportError::InvalidCsvFormat` if the headers or a record
/// cannot be read.
pub fn load_rows(content: &str, delimiter: Option<u8>) -> Result<CsvTable, ImportError> {
    let content: &str = strip_bom(content);
    let delimiter: u8 = delimiter.unwrap_or_else(|| detect_delimiter(content));
    let mut reader = csv_reader(content, delimiter, true);

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| ImportError::InvalidCsvFormat {
            reason: format!("Failed to read CSV headers: {e}"),
        })?
        .clone();

    let mut rows: Vec<FieldRow> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record: StringRecord = result.map_err(|e| ImportError::InvalidCsvFormat {
            reason: format!("Failed to read row {}: {e}", idx + 1),
        })?;
        let row: FieldRow = row_from_record(&headers, &record);
        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(CsvTable { headers, rows })
}
