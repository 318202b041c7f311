/// Contains the general cell store access bits
///
/// Store access is abstracted into a [client::CellStoreClient] which
/// contains the handful of row level operations the record layer needs.
/// Everything above the trait works on decoded [cell::Cell]s and
/// still-encoded [row::Row]s; the store's own wire format stays inside the
/// implementation ([hbase::HBaseClientImpl]).
use std::time::Duration;

pub mod cell;
pub mod client;
pub mod error;
pub mod hbase;
pub mod row;

// used by unit and handler tests
pub mod mock;

// These are more for code clarity than functional types.
pub type RowKey = String;
pub type Qualifier = String;
pub type FamilyId = String;

/// Separates the family from the qualifier in a column identifier.
pub const COLUMN_SEPARATOR: char = ':';

/// Settings for the store client.
#[derive(Clone, Debug)]
pub struct StoreSettings {
    /// Base URL of the store's REST gateway (e.g. `http://hbase-rest:8080`)
    pub url: String,
    /// Timeout applied to row and schema requests
    pub timeout: Duration,
    /// Timeout applied to the cluster version (connectivity) check
    pub health_timeout: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: "http://hbase-rest:8080".to_owned(),
            timeout: Duration::from_secs(10),
            health_timeout: Duration::from_secs(5),
        }
    }
}
