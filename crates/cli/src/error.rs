use std::fmt;

use propostas_io::IoError;
use propostas_recon::ReconError;
use propostas_store::StoreError;

use crate::flow::FlowState;

/// Operation-scoped import failures. Each aborts before anything is
/// staged or persisted.
#[derive(Debug)]
pub enum ImportError {
    NoSourceSelected,
    MissingPeriod,
    InvalidPeriod(String),
    /// Unreadable file, unknown encoding or undecodable content.
    Read(IoError),
    SpreadsheetUnavailable,
    Schema(ReconError),
    Store(StoreError),
    /// `persist` called before every preview was confirmed.
    NotConfirmed(FlowState),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSourceSelected => write!(f, "select at least one source file"),
            Self::MissingPeriod => write!(f, "competency month and year are required"),
            Self::InvalidPeriod(msg) => write!(f, "invalid competency period: {msg}"),
            Self::Read(e) => write!(f, "{e}"),
            Self::SpreadsheetUnavailable => {
                write!(f, "spreadsheet decoding is not available; cannot read the insurance export")
            }
            Self::Schema(e) => write!(f, "{e}"),
            Self::Store(e) => write!(f, "{e}"),
            Self::NotConfirmed(state) => write!(f, "import not confirmed (state: {state})"),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<IoError> for ImportError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::SpreadsheetUnavailable => Self::SpreadsheetUnavailable,
            other => Self::Read(other),
        }
    }
}

impl From<StoreError> for ImportError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MissingPeriod => Self::MissingPeriod,
            StoreError::InvalidPeriod(msg) => Self::InvalidPeriod(msg),
            other => Self::Store(other),
        }
    }
}

impl From<ReconError> for ImportError {
    fn from(e: ReconError) -> Self {
        Self::Schema(e)
    }
}
