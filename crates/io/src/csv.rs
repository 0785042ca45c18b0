// Semicolon-delimited text import

use propostas_recon::TabularData;

use crate::error::IoError;

pub const DELIMITER: u8 = b';';

/// Split exported text into a header and body rows.
///
/// Line endings are normalized, trailing whitespace is trimmed and blank
/// lines are dropped before anything else, so they never take a line
/// number. Quotes are not special and rows may be ragged.
pub fn parse(text: &str) -> Result<TabularData, IoError> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized
        .split('\n')
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        return Ok(TabularData::default());
    }

    let joined = lines.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(joined.as_bytes());

    let mut records = reader.records();
    let header: Vec<String> = match records.next() {
        Some(first) => first
            .map_err(|e| IoError::Delimited(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => return Ok(TabularData::default()),
    };

    let mut rows = Vec::with_capacity(lines.len() - 1);
    for result in records {
        let record = result.map_err(|e| IoError::Delimited(e.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    log::debug!("delimited: {} column(s), {} row(s)", header.len(), rows.len());
    Ok(TabularData::new(header, rows))
}
