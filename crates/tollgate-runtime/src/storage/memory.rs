//! In-memory record store.

use super::{NewRecord, RecordStore, StorageError};
use parking_lot::Mutex;
use serde_json::Value;
use tollgate_envelope::Record;
use tollgate_types::{RecordId, RequestId};
use tracing::debug;

/// Process-local [`RecordStore`] backed by a mutex-guarded vec.
///
/// Record ids are assigned monotonically and never reused, so a
/// deleted record's id stays dangling rather than pointing at a
/// newer record.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    records: Vec<Record>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total record count across all tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    async fn insert(&self, record: NewRecord) -> Result<Record, StorageError> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let stored = Record {
            id: RecordId(inner.next_id),
            request_id: record.request_id,
            item_type: record.item_type,
            table_name: record.table_name,
            payload: record.payload,
        };
        inner.records.push(stored.clone());
        debug!(record = %stored.id, table = %stored.table_name, "record inserted");
        Ok(stored)
    }

    async fn find_by_request_id(
        &self,
        request_id: &RequestId,
    ) -> Result<Option<Record>, StorageError> {
        let inner = self.inner.lock();
        Ok(inner
            .records
            .iter()
            .find(|r| &r.request_id == request_id)
            .cloned())
    }

    async fn query_table(&self, table: &str) -> Result<Vec<Record>, StorageError> {
        let inner = self.inner.lock();
        Ok(inner
            .records
            .iter()
            .filter(|r| r.table_name == table)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        table: &str,
        id: RecordId,
        payload: Option<Value>,
    ) -> Result<Option<Record>, StorageError> {
        let mut inner = self.inner.lock();
        let Some(record) = inner
            .records
            .iter_mut()
            .find(|r| r.table_name == table && r.id == id)
        else {
            return Ok(None);
        };
        record.payload = payload;
        debug!(record = %id, table, "record updated");
        Ok(Some(record.clone()))
    }

    async fn delete(&self, table: &str, id: RecordId) -> Result<Option<Record>, StorageError> {
        let mut inner = self.inner.lock();
        let Some(index) = inner
            .records
            .iter()
            .position(|r| r.table_name == table && r.id == id)
        else {
            return Ok(None);
        };
        let removed = inner.records.remove(index);
        debug!(record = %id, table, "record deleted");
        Ok(Some(removed))
    }
}
