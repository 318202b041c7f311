//! Error handling for the record layer
//!

use std::fmt::{self, Display};
use std::io;

use backtrace::Backtrace;
use thiserror::Error;

use crate::db::error::StoreError;
use crate::mapper::ValidationError;

/// EHR Common error
#[derive(Debug)]
pub struct EhrError {
    pub kind: EhrErrorKind,
    pub backtrace: Box<Backtrace>,
}

// Print out the error and backtrace, including source errors
impl Display for EhrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}\nBacktrace: \n{:?}", self.kind, self.backtrace)?;

        // Go down the chain of errors
        let mut error: &dyn std::error::Error = &self.kind;
        while let Some(source) = error.source() {
            write!(f, "\n\nCaused by: {source}")?;
            error = source;
        }

        Ok(())
    }
}

impl std::error::Error for EhrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// Forward From impls to EhrError from EhrErrorKind. Because From is reflexive,
// this impl also takes care of From<EhrErrorKind>.
impl<T> From<T> for EhrError
where
    EhrErrorKind: From<T>,
{
    fn from(item: T) -> Self {
        EhrError {
            kind: EhrErrorKind::from(item),
            backtrace: Box::new(Backtrace::new()),
        }
    }
}

impl EhrError {
    /// The user facing message, without the backtrace.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, EhrErrorKind::Validation(_))
    }
}

#[derive(Error, Debug)]
pub enum EhrErrorKind {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Required input was missing. Nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Passed through from the store client untouched.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("General Error: {0}")]
    GeneralError(String),
}

pub type Result<T> = std::result::Result<T, EhrError>;
