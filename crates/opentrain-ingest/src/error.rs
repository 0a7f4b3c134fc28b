//! Error types for the ingestion pipeline
//!
//! Every error here is fatal to a run: nothing is caught and retried
//! internally. Rerunning starts again from a full schema reset.

use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// A compact time or date token could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed time token '{0}': expected up to 4 digits (HHMM)")]
    MalformedTimeToken(String),

    #[error("malformed date token '{0}': expected YYYYMMDD")]
    MalformedDateToken(String),
}

/// Why a single input line could not be turned into a `TrainStop`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected at least {expected} tab-separated fields, found {found}")]
    MissingFields { expected: usize, found: usize },

    #[error("field '{field}': {source}")]
    Decode {
        field: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error("field '{field}': invalid integer '{value}'")]
    Integer {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("line is not valid UTF-8")]
    Encoding(#[source] std::str::Utf8Error),
}

/// Errors surfaced by a loader run
#[derive(Error, Debug)]
pub enum IngestError {
    /// A line failed to parse; the run stops before any further line
    #[error("Malformed record at line {line}: {source}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: RecordError,
    },

    /// DDL failed; the reset transaction was rolled back
    #[error("Schema reset failed during {phase}: {source}")]
    SchemaReset {
        phase: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A commit failed; the staged batch is lost, earlier batches are durable
    #[error("Persistence failed: {0}")]
    Persistence(#[source] sqlx::Error),

    #[error("Failed to read input file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}. Check DATABASE_URL and connection settings.")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Config(#[from] opentrain_common::OpentrainError),
}

impl IngestError {
    pub(crate) fn schema_reset(phase: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::SchemaReset { phase, source }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
