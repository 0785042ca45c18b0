//! `propostas-store`: batch persistence keyed by competency period.
//!
//! Batches live in a [`KeyValueStore`]; the store is passed in explicitly so
//! tests never share state.

pub mod batch;
pub mod error;
pub mod kv;
pub mod period;
pub mod sqlite;

pub use batch::{Batch, BatchStore};
pub use error::StoreError;
pub use kv::{KeyValueStore, MemoryStore};
pub use period::Competencia;
pub use sqlite::SqliteStore;
