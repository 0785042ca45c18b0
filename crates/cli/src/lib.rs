//! `propostas-cli` library half: the import pipeline and the preview flow
//! driven by the `propostas` binary.

pub mod error;
pub mod flow;
pub mod import;
pub mod render;

pub use error::ImportError;
pub use flow::{AutoConfirm, Confirm, FlowState, ImportFlow, SourcePreview};
pub use import::{import, ImportRequest};
