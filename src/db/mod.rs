//! Record access layer: per-entity CRUD over the hosted backend.
//!
//! Every repository function takes `&impl Backend` so the same code runs
//! against the HTTP client and against the in-memory backend used in tests.

pub mod category;
pub mod connection;
pub mod daily_expense;
pub mod financial_entry;
pub mod membership;
pub mod patient;
pub mod patient_account;
pub mod query;
pub mod user_role;

#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};

pub use connection::{TableCounts, get_table_counts, test_connection};
pub use query::{Filter, FilterOp, Order, Query, Table};

/// Row-level access to the managed tables.
///
/// Rows travel as JSON objects; the repositories convert them to typed
/// records. Row-level authorization is the backend's concern.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Rows matching the query, in query order.
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>>;

    /// Exact number of rows matching the query.
    async fn count(&self, table: Table, query: &Query) -> Result<u64>;

    /// Insert one row and return it as stored (with generated columns).
    async fn insert(&self, table: Table, row: Value) -> Result<Value>;

    /// Patch every matching row; returns the updated rows.
    async fn update(&self, table: Table, query: &Query, patch: Value) -> Result<Vec<Value>>;

    /// Delete every matching row; returns the number deleted.
    async fn delete(&self, table: Table, query: &Query) -> Result<u64>;
}

/// Deserialize a list of rows into typed records.
pub(crate) fn decode_rows<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter().map(|row| decode_row(table, row)).collect()
}

pub(crate) fn decode_row<T: DeserializeOwned>(table: Table, row: Value) -> Result<T> {
    serde_json::from_value(row).map_err(|e| AppError::parse(format!("Invalid {table} row: {e}")))
}

/// Serialize a DTO into a JSON object row.
pub(crate) fn encode<T: Serialize>(data: &T) -> Result<Value> {
    Ok(serde_json::to_value(data)?)
}

/// Attach `created_by` to an insert payload.
pub(crate) fn stamp_creator(mut row: Value, created_by: uuid::Uuid) -> Value {
    if let Value::Object(map) = &mut row {
        map.insert("created_by".to_string(), Value::String(created_by.to_string()));
    }
    row
}
