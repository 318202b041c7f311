use serde_derive::{Deserialize, Serialize};

use super::{FamilyId, Qualifier, COLUMN_SEPARATOR};
use crate::codec;

/// A decoded cell, as produced by the record mapper.
///
/// `family` and `qualifier` together form the column identity. Only one
/// value per column is kept; the store's cell versions are not exposed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Cell {
    /// The family identifier string.
    pub family: FamilyId,
    /// Column name
    pub qualifier: Qualifier,
    /// Column data
    pub value: String,
}

impl Cell {
    pub fn new(family: &str, qualifier: &str, value: impl Into<String>) -> Self {
        Self {
            family: family.to_owned(),
            qualifier: qualifier.to_owned(),
            value: value.into(),
        }
    }

    /// The `family:qualifier` column identifier
    pub fn column(&self) -> String {
        format!("{}{}{}", self.family, COLUMN_SEPARATOR, self.qualifier)
    }

    /// Encode the column identifier and value for the wire.
    pub fn encode(&self) -> EncodedCell {
        EncodedCell {
            column: codec::encode(self.column()),
            value: codec::encode(&self.value),
            timestamp: None,
        }
    }
}

/// A cell as the store transmits it: base64 column identifier and value.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EncodedCell {
    pub column: String,
    #[serde(rename = "$", default)]
    pub value: String,
    /// Store assigned version; only present on reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl EncodedCell {
    /// Build an encoded cell from an already formed column identifier.
    ///
    /// Mostly useful for feeding raw store output into tests.
    pub fn from_raw(column: &str, value: &str) -> Self {
        Self {
            column: codec::encode(column),
            value: codec::encode(value),
            timestamp: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_cell() {
        let cell = Cell::new("conditions", "status", "Active");
        assert_eq!(cell.column(), "conditions:status");
        let encoded = cell.encode();
        assert_eq!(encoded.column, "Y29uZGl0aW9uczpzdGF0dXM=");
        assert_eq!(codec::decode(&encoded.value), "Active");
        assert_eq!(encoded, EncodedCell::from_raw("conditions:status", "Active"));
    }

    #[test]
    fn wire_shape() {
        let json = serde_json::to_value(Cell::new("orders", "test_type", "CBC").encode()).unwrap();
        assert_eq!(json["column"], codec::encode("orders:test_type"));
        assert_eq!(json["$"], codec::encode("CBC"));
        assert!(json.get("timestamp").is_none());

        let read: EncodedCell = serde_json::from_str(
            r#"{"column":"b3JkZXJzOnRlc3RfdHlwZQ==","timestamp":1696161600000,"$":"Q0JD"}"#,
        )
        .unwrap();
        assert_eq!(read.timestamp, Some(1696161600000));
        assert_eq!(codec::decode(&read.value), "CBC");
    }
}
