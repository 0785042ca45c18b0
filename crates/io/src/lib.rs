// Source acquisition and tabular parsing

pub mod csv;
pub mod error;
pub mod source;
pub mod xlsx;

pub use error::IoError;
pub use source::{FsReader, SourceContent, SourceFormat, SourceReader, SourceRequest};
