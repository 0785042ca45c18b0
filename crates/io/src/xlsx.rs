// Spreadsheet (xlsx/xls/ods) import
//
// Only the first worksheet is read. Every cell becomes text so both
// parser variants hand the same shape to staging.

use propostas_recon::TabularData;

use crate::error::IoError;

/// Whether this build can decode workbooks.
pub fn is_available() -> bool {
    cfg!(feature = "xlsx")
}

#[cfg(feature = "xlsx")]
pub fn parse(bytes: &[u8]) -> Result<TabularData, IoError> {
    use std::io::Cursor;

    use calamine::{open_workbook_auto_from_rs, Reader};

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| IoError::Spreadsheet(format!("failed to open workbook: {e}")))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => {
            range.map_err(|e| IoError::Spreadsheet(format!("failed to read first sheet: {e}")))?
        }
        None => {
            log::warn!("workbook has no sheets");
            return Ok(TabularData::default());
        }
    };

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(first) => first.iter().map(|c| cell_text(c).trim().to_string()).collect(),
        None => return Ok(TabularData::default()),
    };
    let body: Vec<Vec<String>> = rows.map(|r| r.iter().map(cell_text).collect()).collect();

    log::debug!("spreadsheet: {} column(s), {} row(s)", header.len(), body.len());
    Ok(TabularData::new(header, body))
}

#[cfg(not(feature = "xlsx"))]
pub fn parse(_bytes: &[u8]) -> Result<TabularData, IoError> {
    Err(IoError::SpreadsheetUnavailable)
}

/// Plain textual form of a cell. Dates stay as serial numbers.
#[cfg(feature = "xlsx")]
fn cell_text(cell: &calamine::Data) -> String {
    use calamine::Data;

    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => decimal_comma(*n),
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => (if *b { "true" } else { "false" }).to_string(),
        Data::Error(e) => e.to_string(),
        Data::DateTime(dt) => decimal_comma(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Numbers are written the way the delimited exports write them (comma as
/// decimal separator, no grouping) so one numeric parser serves both.
#[cfg(feature = "xlsx")]
fn decimal_comma(n: f64) -> String {
    format!("{}", n).replacen('.', ",", 1)
}


// cargo test -p propostas-io --no-default-features
#[cfg(all(test, not(feature = "xlsx")))]
mod unavailable_tests {
    use super::*;

    #[test]
    fn parse_reports_missing_decoder() {
        assert!(!is_available());
        let err = parse(b"PK\x03\x04").unwrap_err();
        assert!(matches!(err, IoError::SpreadsheetUnavailable));
    }
}
