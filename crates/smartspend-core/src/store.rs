//! Session record store
//!
//! An ordered, append-only collection of extracted receipts. The only way to
//! remove records is a full [`RecordStore::clear`].

use serde::Serialize;
use tracing::{debug, info};

use crate::models::ReceiptRecord;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordStore {
    records: Vec<ReceiptRecord>,
    /// Bumped on every change; lets callers tell whether derived text is stale
    #[serde(skip)]
    revision: u64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenate `batch` after the existing records.
    ///
    /// Duplicates are kept: uploading the same receipt twice yields two records.
    pub fn append(&mut self, batch: Vec<ReceiptRecord>) {
        if batch.is_empty() {
            return;
        }
        debug!(added = batch.len(), existing = self.records.len(), "Appending receipts");
        self.records.extend(batch);
        self.revision += 1;
    }

    /// Discard every record. Not undoable.
    pub fn clear(&mut self) {
        info!(discarded = self.records.len(), "Clearing receipt history");
        self.records.clear();
        self.revision += 1;
    }

    pub fn snapshot(&self) -> &[ReceiptRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
