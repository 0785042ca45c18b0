//! `propostas-recon`: staging and reconciliation of financed-sales exports.
//!
//! Pure engine crate: receives parsed tables, returns staged rows and the
//! joined proposals. No CLI, file or storage dependencies.

pub mod columns;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod model;
pub mod normalize;
pub mod staging;
pub mod tabular;

pub use config::SchemaConfig;
pub use engine::{run, ReconInput};
pub use error::ReconError;
pub use model::{Proposal, ReconciliationResult, SourceKind};
pub use staging::StagingTable;
pub use tabular::TabularData;
