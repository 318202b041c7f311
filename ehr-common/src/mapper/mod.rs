//! Record assembly and decomposition.
//!
//! [flatten] turns a domain record into a row key and the cells to write.
//! [group] turns the encoded cells of a stored row back into a
//! `family -> qualifier -> value` structure, which the [project] functions
//! read into the public record shapes.
//!
//! Nothing in here talks to the store or keeps state between calls.
use thiserror::Error;

use crate::schema::RecordKind;

pub mod flatten;
pub mod group;
pub mod project;

pub use self::flatten::{flatten, FlatRecord, RowKeyStrategy, WriteContext};
pub use self::group::{group, group_with_diagnostics, DecodeSkipped, GroupedCellSet};

/// Required input was missing. Raised before anything is written.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("Missing required field(s) for {kind}: {}", .missing.join(", "))]
pub struct ValidationError {
    pub kind: RecordKind,
    pub missing: Vec<String>,
}

impl ValidationError {
    pub fn new(kind: RecordKind, missing: Vec<String>) -> Self {
        Self { kind, missing }
    }
}
