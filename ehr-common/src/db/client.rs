use async_trait::async_trait;
use mockall::automock;
use serde_derive::Serialize;

use crate::db::cell::Cell;
use crate::db::error::StoreResult;
use crate::db::row::Row;
use crate::schema::TableSchema;

/// Outcome of a table creation request.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Created,
    Exists,
}

/// Provides the row level operations the record layer needs from a
/// wide-column store.
///
/// This is usually manifested by [crate::db::hbase::HBaseClientImpl]
///
#[automock] // must appear before #[async_trait]
#[async_trait]
pub trait CellStoreClient: Send + Sync {
    /// Write a row. Existing columns of the same row are overwritten.
    async fn put_row(&self, table: &str, row_key: &str, cells: Vec<Cell>) -> StoreResult<()>;

    /// Read a single row by its key. `None` if the row does not exist.
    async fn get_row(&self, table: &str, row_key: &str) -> StoreResult<Option<Row>>;

    /// Read every row of a table.
    async fn scan_table(&self, table: &str) -> StoreResult<Vec<Row>>;

    /// Create (or update) a table with the given column families.
    async fn create_table(&self, schema: &TableSchema) -> StoreResult<TableStatus>;

    /// Fetch the store cluster's version information, used as a
    /// connectivity check.
    async fn cluster_version(&self) -> StoreResult<serde_json::Value>;

    fn box_clone(&self) -> Box<dyn CellStoreClient>;
}

impl Clone for Box<dyn CellStoreClient> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}
