use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// Settings file exists but could not be read.
    Read { path: String, message: String },
    /// Settings file is not valid TOML for [`crate::Settings`].
    Parse { path: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Parse { path, message } => write!(f, "invalid settings in {path}: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}
