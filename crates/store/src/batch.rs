// Period-keyed batches of reconciliation results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use propostas_recon::ReconciliationResult;

use crate::error::StoreError;
use crate::kv::KeyValueStore;
use crate::period::Competencia;

/// Every batch, most recently created first, as one JSON array.
pub const BATCHES_KEY: &str = "import_batches_v1";
/// Key of the most recently saved batch.
pub const LAST_BATCH_KEY: &str = "import_last_batch_v1";
/// Unkeyed snapshot written before batches existed.
pub const SNAPSHOT_KEY: &str = "import_v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub mes: u32,
    pub ano: i32,
    pub competencia_key: String,
    pub competencia_label: String,
    pub processed_at: DateTime<Utc>,
    pub data: ReconciliationResult,
}

impl Batch {
    fn new(period: &Competencia, data: ReconciliationResult) -> Self {
        Self {
            id: format!("batch_{}", uuid::Uuid::new_v4().simple()),
            mes: period.mes,
            ano: period.ano,
            competencia_key: period.key(),
            competencia_label: period.label(),
            processed_at: Utc::now(),
            data,
        }
    }
}

/// Batch persistence over any [`KeyValueStore`].
///
/// The batch list is a single entry, so replacing or inserting a batch is
/// one `set` and never a merge of partial writes.
pub struct BatchStore<S> {
    kv: S,
}

impl<S: KeyValueStore> BatchStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn into_inner(self) -> S {
        self.kv
    }

    /// Save `data` under `period`. An existing batch for the same period is
    /// replaced in place and keeps its id; otherwise the new batch goes to
    /// the front. The last-batch pointer always moves to this period.
    pub fn save(&mut self, data: ReconciliationResult, period: &Competencia) -> Result<Batch, StoreError> {
        let key = period.key();
        let mut batches = self.list()?;

        let batch = match batches.iter().position(|b| b.competencia_key == key) {
            Some(idx) => {
                let existing = &mut batches[idx];
                existing.data = data;
                existing.processed_at = Utc::now();
                log::info!("replaced batch {} ({})", existing.id, key);
                existing.clone()
            }
            None => {
                let batch = Batch::new(period, data);
                log::info!("created batch {} ({})", batch.id, key);
                batches.insert(0, batch.clone());
                batch
            }
        };

        let json = serde_json::to_string(&batches).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.kv.set(BATCHES_KEY, &json)?;
        self.kv.set(LAST_BATCH_KEY, &key)?;
        Ok(batch)
    }

    /// Data of the most recently saved batch, else the legacy snapshot.
    pub fn load(&self) -> Result<Option<ReconciliationResult>, StoreError> {
        if let Some(key) = self.last_key()? {
            if let Some(batch) = self.get_by_key(&key)? {
                return Ok(Some(batch.data));
            }
        }
        self.snapshot()
    }

    pub fn get_by_key(&self, key: &str) -> Result<Option<Batch>, StoreError> {
        Ok(self.list()?.into_iter().find(|b| b.competencia_key == key))
    }

    /// All batches, most recently created first. An undecodable list reads
    /// as empty.
    pub fn list(&self) -> Result<Vec<Batch>, StoreError> {
        let Some(raw) = self.kv.get(BATCHES_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(batches) => Ok(batches),
            Err(e) => {
                log::warn!("ignoring unreadable batch list: {e}");
                Ok(Vec::new())
            }
        }
    }

    pub fn last_key(&self) -> Result<Option<String>, StoreError> {
        self.kv.get(LAST_BATCH_KEY)
    }

    pub fn save_snapshot(&mut self, data: &ReconciliationResult) -> Result<(), StoreError> {
        let json = serde_json::to_string(data).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.kv.set(SNAPSHOT_KEY, &json)
    }

    /// Drops the legacy snapshot. The last-batch pointer is kept.
    pub fn clear_snapshot(&mut self) -> Result<(), StoreError> {
        self.kv.remove(SNAPSHOT_KEY)
    }

    /// Remove every batch, the pointer and the snapshot.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.kv.remove(BATCHES_KEY)?;
        self.kv.remove(LAST_BATCH_KEY)?;
        self.kv.remove(SNAPSHOT_KEY)?;
        log::info!("cleared all batches");
        Ok(())
    }

    fn snapshot(&self) -> Result<Option<ReconciliationResult>, StoreError> {
        let Some(raw) = self.kv.get(SNAPSHOT_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                log::warn!("ignoring unreadable snapshot: {e}");
                Ok(None)
            }
        }
    }
}
