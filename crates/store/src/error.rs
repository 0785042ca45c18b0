use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// Month or year not provided.
    MissingPeriod,
    /// Month or year provided but out of range or not a number.
    InvalidPeriod(String),
    /// The key-value backend failed.
    Backend(String),
    /// A value could not be encoded.
    Serialization(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPeriod => write!(f, "competency month and year are required"),
            Self::InvalidPeriod(msg) => write!(f, "invalid competency period: {msg}"),
            Self::Backend(msg) => write!(f, "storage error: {msg}"),
            Self::Serialization(msg) => write!(f, "serialization error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Backend(e.to_string())
    }
}
