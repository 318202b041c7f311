use std::collections::BTreeMap;
use std::fmt;

use serde_derive::Serialize;

use crate::codec::{self, CodecError};
use crate::db::{cell::EncodedCell, row::Row, FamilyId, Qualifier, COLUMN_SEPARATOR};
use crate::schema::{RecordSchema, OWNER_QUALIFIER};

/// The decoded cells of one row, indexed by family then qualifier.
///
/// A qualifier that was never written is absent, not empty.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupedCellSet(BTreeMap<FamilyId, BTreeMap<Qualifier, String>>);

impl GroupedCellSet {
    /// Insert a value. A later insert for the same column wins.
    pub fn insert(&mut self, family: &str, qualifier: &str, value: String) -> Option<String> {
        self.0
            .entry(family.to_owned())
            .or_default()
            .insert(qualifier.to_owned(), value)
    }

    pub fn get(&self, family: &str, qualifier: &str) -> Option<&str> {
        self.0
            .get(family)
            .and_then(|columns| columns.get(qualifier))
            .map(String::as_str)
    }

    /// All qualifiers of a family.
    pub fn family(&self, family: &str) -> Option<&BTreeMap<Qualifier, String>> {
        self.0.get(family)
    }

    /// Read a field through its declared route.
    pub fn field(&self, schema: &RecordSchema, field: &str) -> Option<String> {
        let route = schema.route(field)?;
        self.get(route.family, route.qualifier()?).map(str::to_owned)
    }

    /// The owner identifier of a sub-record row.
    pub fn owner(&self, schema: &RecordSchema) -> Option<&str> {
        self.get(schema.owner_family?, OWNER_QUALIFIER)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of stored columns.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }
}

/// Why a cell was left out of a [GroupedCellSet].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SkipReason {
    /// The column identifier is not a valid token.
    Undecodable(CodecError),
    /// The decoded column identifier has no `family:` prefix.
    NoFamily(String),
}

/// Diagnostic for one cell skipped while grouping. Never fatal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodeSkipped {
    /// Position of the cell in the row.
    pub index: usize,
    /// The column identifier as received.
    pub column: String,
    pub reason: SkipReason,
}

impl fmt::Display for DecodeSkipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::Undecodable(e) => {
                write!(f, "cell {} column {:?}: {}", self.index, self.column, e)
            }
            SkipReason::NoFamily(decoded) => write!(
                f,
                "cell {} column {:?} has no family separator",
                self.index, decoded
            ),
        }
    }
}

/// Split a decoded column identifier at the first separator. Family names
/// never contain the separator; qualifiers may.
fn split_column(column: &str) -> Option<(&str, &str)> {
    column
        .split_once(COLUMN_SEPARATOR)
        .filter(|(family, _)| !family.is_empty())
}

/// Group encoded cells, returning a diagnostic for every skipped cell.
pub fn group_with_diagnostics(cells: &[EncodedCell]) -> (GroupedCellSet, Vec<DecodeSkipped>) {
    let mut grouped = GroupedCellSet::default();
    let mut skipped = Vec::new();
    for (index, cell) in cells.iter().enumerate() {
        let column = match codec::try_decode(&cell.column) {
            Ok(column) => column,
            Err(e) => {
                skipped.push(DecodeSkipped {
                    index,
                    column: cell.column.clone(),
                    reason: SkipReason::Undecodable(e),
                });
                continue;
            }
        };
        let Some((family, qualifier)) = split_column(&column) else {
            skipped.push(DecodeSkipped {
                index,
                column: cell.column.clone(),
                reason: SkipReason::NoFamily(column.clone()),
            });
            continue;
        };
        grouped.insert(family, qualifier, codec::decode(&cell.value));
    }
    (grouped, skipped)
}

/// Group encoded cells into `family -> qualifier -> value`.
///
/// Malformed column identifiers are logged and skipped; the rest of the
/// row is still grouped.
pub fn group(cells: &[EncodedCell]) -> GroupedCellSet {
    let (grouped, skipped) = group_with_diagnostics(cells);
    for skip in skipped {
        warn!("🧩 Skipping cell: {}", skip);
    }
    grouped
}

/// Group every row of a table scan and keep the rows owned by `owner`.
///
/// This is a linear pass over the whole scan; ownership is read from the
/// owner cell, never from the row key.
pub fn filter_owned(rows: &[Row], schema: &RecordSchema, owner: &str) -> Vec<GroupedCellSet> {
    rows.iter()
        .map(|row| group(&row.cells))
        .filter(|grouped| grouped.owner(schema) == Some(owner))
        .collect()
}
