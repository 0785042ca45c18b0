use serde::{Deserialize, Serialize};

/// Header row plus ordered body rows, as produced by either parser variant.
///
/// Rows may be ragged; positions past the end of a row read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularData {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabularData {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }

    /// 1-based file line of body row `index`; the header is line 1.
    pub fn line_of(index: usize) -> usize {
        index + 2
    }
}

/// Cell at `idx`, if the column was resolved and the row is long enough.
pub fn cell(cols: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| cols.get(i)).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_body_row_is_line_two() {
        assert_eq!(TabularData::line_of(0), 2);
        assert_eq!(TabularData::line_of(1), 3);
    }

    #[test]
    fn cell_out_of_range_is_absent() {
        let cols = vec!["a".to_string()];
        assert_eq!(cell(&cols, Some(0)), Some("a"));
        assert_eq!(cell(&cols, Some(3)), None);
        assert_eq!(cell(&cols, None), None);
    }
}
