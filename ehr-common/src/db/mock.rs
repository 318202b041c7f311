// mockall::mock currently generates these warnings
#![allow(clippy::unused_unit)]
#![allow(clippy::ptr_arg)]

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::cell::Cell;
use crate::db::client::{CellStoreClient, TableStatus};
pub use crate::db::client::MockCellStoreClient;
use crate::db::error::StoreResult;
use crate::db::row::Row;
use crate::schema::TableSchema;

#[async_trait]
impl CellStoreClient for Arc<MockCellStoreClient> {
    async fn put_row(&self, table: &str, row_key: &str, cells: Vec<Cell>) -> StoreResult<()> {
        Arc::as_ref(self).put_row(table, row_key, cells).await
    }

    async fn get_row(&self, table: &str, row_key: &str) -> StoreResult<Option<Row>> {
        Arc::as_ref(self).get_row(table, row_key).await
    }

    async fn scan_table(&self, table: &str) -> StoreResult<Vec<Row>> {
        Arc::as_ref(self).scan_table(table).await
    }

    async fn create_table(&self, schema: &TableSchema) -> StoreResult<TableStatus> {
        Arc::as_ref(self).create_table(schema).await
    }

    async fn cluster_version(&self) -> StoreResult<serde_json::Value> {
        Arc::as_ref(self).cluster_version().await
    }

    fn box_clone(&self) -> Box<dyn CellStoreClient> {
        Box::new(Arc::clone(self))
    }
}

impl MockCellStoreClient {
    /// Convert into a type which can be used in place of `Box<dyn CellStoreClient>`.
    /// Arc is used so that the mock can be cloned. Box is used so it can be
    /// easily cast to `Box<dyn CellStoreClient>`.
    #[allow(clippy::redundant_allocation)]
    pub fn into_boxed_arc(self) -> Box<Arc<Self>> {
        Box::new(Arc::new(self))
    }
}
