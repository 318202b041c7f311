//! Value encoding used for every row key, column identifier and cell value
//! exchanged with the store.
//!
//! The store's REST interface only carries base64 text, so all values are
//! encoded with the standard (padded) alphabet. The codec works on whole
//! values: separators such as `:` and `_` are encoded like any other byte.
use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid base64 token: {0}")]
    Alphabet(String),

    #[error("Decoded token is not UTF-8: {0}")]
    Utf8(String),
}

/// Encode a text value into a transport token.
pub fn encode<T: AsRef<str>>(value: T) -> String {
    STANDARD.encode(value.as_ref().as_bytes())
}

/// Stringify a scalar before encoding it.
pub fn encode_scalar<T: ToString>(value: T) -> String {
    encode(value.to_string())
}

/// Decode a transport token, reporting why it could not be read.
pub fn try_decode(token: &str) -> Result<String, CodecError> {
    let bytes = STANDARD
        .decode(token.as_bytes())
        .map_err(|e| CodecError::Alphabet(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CodecError::Utf8(e.to_string()))
}

/// Decode a transport token.
///
/// A malformed token decodes to an empty string so that a single bad cell
/// does not fail the row (or table scan) it belongs to.
pub fn decode(token: &str) -> String {
    try_decode(token).unwrap_or_else(|e| {
        warn!("🔣 Token decode error: {}", e; "token" => token);
        String::new()
    })
}
