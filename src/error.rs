//! Error types
//!
//! The core surfaces these to its caller; the binary decides how to present
//! them.

use gix::ObjectId;
use thiserror::Error;

use crate::model::ObjectKind;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The reference filter could not be built
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid regexp: {pattern:?}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// The object source could not produce what it promised
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("couldn't open Git repository at {path}")]
    Open {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("this appears to be a shallow clone; full clone required")]
    Shallow,

    #[error("failed to list references")]
    References(#[source] BoxError),

    #[error("failed to read object {id}")]
    Read {
        id: ObjectId,
        #[source]
        source: BoxError,
    },

    #[error("object {id} is malformed: {reason}")]
    Malformed { id: ObjectId, reason: String },

    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// A scan could not complete; no partial aggregate is produced
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("object {id} (referenced by {parent}) was never produced by the object source")]
    MissingObject { id: ObjectId, parent: ObjectId },

    #[error("object {id} (referenced by {parent}) is a {found}, expected {expected}")]
    UnexpectedKind {
        id: ObjectId,
        parent: ObjectId,
        expected: &'static str,
        found: ObjectKind,
    },

    #[error("internal invariant violated: {0}")]
    Invariant(String),

    #[error("scan aborted")]
    Cancelled,
}

/// Invalid report or scan options, rejected before any scan work
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid threshold {0:?}: expected a non-negative integer")]
    InvalidThreshold(String),

    #[error("invalid name style {0:?}: expected one of 'none', 'hash', 'full'")]
    InvalidNameStyle(String),

    #[error("JSON version must be 1 or 2 (got {0})")]
    InvalidJsonVersion(String),

    #[error("invalid severity base {0:?}: expected a number greater than 1")]
    InvalidSeverityBase(String),
}
