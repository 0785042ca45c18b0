use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Schema validation error (empty key candidates, blank candidate, etc.).
    ConfigValidation(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "schema parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "schema validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
