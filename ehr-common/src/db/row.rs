use serde_derive::{Deserialize, Serialize};

use super::cell::{Cell, EncodedCell};
use crate::codec::{self, CodecError};

/// A row as the store transmits it. The key and every cell are still
/// encoded; decoding is left to the record mapper so that a bad cell can be
/// skipped instead of failing the whole row.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// The row's encoded key.
    pub key: String,
    /// The row's cells, in store order.
    #[serde(rename = "Cell", default)]
    pub cells: Vec<EncodedCell>,
}

impl Row {
    /// Build an encoded row from decoded cells
    pub fn from_cells(row_key: &str, cells: &[Cell]) -> Self {
        Self {
            key: codec::encode(row_key),
            cells: cells.iter().map(Cell::encode).collect(),
        }
    }

    /// The decoded row key
    pub fn row_key(&self) -> Result<String, CodecError> {
        codec::try_decode(&self.key)
    }
}

/// The store's envelope for one or more rows.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellSet {
    #[serde(rename = "Row", default)]
    pub rows: Vec<Row>,
}

impl From<Row> for CellSet {
    fn from(row: Row) -> Self {
        Self { rows: vec![row] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_set_wire_shape() {
        let row = Row::from_cells("PAT_001", &[Cell::new("personal_info", "first_name", "John")]);
        let json = serde_json::to_value(CellSet::from(row.clone())).unwrap();
        assert_eq!(json["Row"][0]["key"], "UEFUXzAwMQ==");
        assert_eq!(
            json["Row"][0]["Cell"][0]["column"],
            codec::encode("personal_info:first_name")
        );
        assert_eq!(json["Row"][0]["Cell"][0]["$"], codec::encode("John"));
        assert_eq!(row.row_key().unwrap(), "PAT_001");
    }

    #[test]
    fn missing_cells_default_empty() {
        let set: CellSet = serde_json::from_str(r#"{"Row":[{"key":"UEFUXzAwMQ=="}]}"#).unwrap();
        assert_eq!(set.rows.len(), 1);
        assert!(set.rows[0].cells.is_empty());
        let set: CellSet = serde_json::from_str("{}").unwrap();
        assert!(set.rows.is_empty());
    }
}
