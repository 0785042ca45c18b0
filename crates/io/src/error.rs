use std::fmt;

#[derive(Debug)]
pub enum IoError {
    /// The selected file could not be read.
    Read { path: String, message: String },
    /// Text encoding label not recognized.
    UnknownEncoding(String),
    /// Built without spreadsheet support.
    SpreadsheetUnavailable,
    /// Workbook could not be decoded.
    Spreadsheet(String),
    /// Delimited text could not be split into records.
    Delimited(String),
    /// Content variant does not match the parser (text given to the
    /// spreadsheet decoder or vice versa).
    ContentMismatch { expected: &'static str },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::UnknownEncoding(label) => write!(f, "unknown text encoding: '{label}'"),
            Self::SpreadsheetUnavailable => {
                write!(f, "spreadsheet support is not available in this build")
            }
            Self::Spreadsheet(msg) => write!(f, "spreadsheet error: {msg}"),
            Self::Delimited(msg) => write!(f, "delimited text error: {msg}"),
            Self::ContentMismatch { expected } => write!(f, "expected {expected} content"),
        }
    }
}

impl std::error::Error for IoError {}
