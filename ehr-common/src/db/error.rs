use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a cell store client.
///
/// These are handed to the caller as-is; the record layer neither
/// interprets nor retries them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store request timed out")]
    Timeout,

    #[error("Store connection error: {0}")]
    Connection(#[source] reqwest::Error),

    /// The store answered with a non success status. `message` is the
    /// store's response body.
    #[error("Store responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid store response: {0}")]
    Deserialize(String),

    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StoreError::Timeout
        } else if e.is_decode() {
            StoreError::Deserialize(e.to_string())
        } else {
            StoreError::Connection(e)
        }
    }
}

impl StoreError {
    pub fn metric_label(&self) -> &'static str {
        match &self {
            StoreError::Timeout => "storage.hbase.error.timeout",
            StoreError::Connection(_) => "storage.hbase.error.connection",
            StoreError::Status { .. } => "storage.hbase.error.status",
            StoreError::Deserialize(_) => "storage.hbase.error.deserialize",
            StoreError::InvalidUrl(_) => "storage.hbase.error.url",
        }
    }
}
