//! Record storage abstraction.
//!
//! The [`RecordStore`] trait defines the interface the executor writes
//! through. This allows pluggable backends (in-memory, embedded db,
//! remote service).

use super::StorageError;
use serde_json::Value;
use std::future::Future;
use tollgate_envelope::Record;
use tollgate_types::{RecordId, RequestId};

/// A record about to be inserted, before the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    /// Originating request, kept for idempotent replay detection.
    pub request_id: RequestId,
    /// Caller-supplied item type, stored verbatim.
    pub item_type: String,
    /// Server-derived table the record lands in.
    pub table_name: String,
    /// Arbitrary JSON body.
    pub payload: Option<Value>,
}

/// Record storage abstraction.
///
/// Implementations must be thread-safe (`Send + Sync`) for use across
/// async tasks. `update` and `delete` scope their lookup to a single
/// table; a record in another table is invisible to them.
pub trait RecordStore: Send + Sync + 'static {
    /// Inserts a record and returns it with its assigned id.
    fn insert(&self, record: NewRecord)
        -> impl Future<Output = Result<Record, StorageError>> + Send;

    /// Looks up the record created by a given request, if any.
    fn find_by_request_id(
        &self,
        request_id: &RequestId,
    ) -> impl Future<Output = Result<Option<Record>, StorageError>> + Send;

    /// Returns every record in a table, oldest first.
    fn query_table(
        &self,
        table: &str,
    ) -> impl Future<Output = Result<Vec<Record>, StorageError>> + Send;

    /// Replaces the payload of a record in a table.
    ///
    /// Returns the updated record, or `None` when the table holds no
    /// record with that id.
    fn update(
        &self,
        table: &str,
        id: RecordId,
        payload: Option<Value>,
    ) -> impl Future<Output = Result<Option<Record>, StorageError>> + Send;

    /// Removes a record from a table.
    ///
    /// Returns the removed record, or `None` when the table holds no
    /// record with that id.
    fn delete(
        &self,
        table: &str,
        id: RecordId,
    ) -> impl Future<Output = Result<Option<Record>, StorageError>> + Send;
}
