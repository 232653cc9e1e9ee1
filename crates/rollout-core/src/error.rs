//! Error types for the failure classes that are not plain lookup misses.
//!
//! Lookup misses (`NotFound`) are deliberately not errors: store operations
//! return `Option`/`bool` so callers can skip a view refresh and move on.
//! The types here cover the cases that must surface to an operator.

use thiserror::Error;

/// A snapshot failed validation during rollback. The store is left in its
/// pre-restore (staging) state; a partial rollback never happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestoreError {
    #[error("snapshot holds duplicate version id {0}")]
    DuplicateVersionId(u64),
    #[error("snapshot holds duplicate work item id {0}")]
    DuplicateCduId(u64),
    #[error("snapshot marks missing version {0} as production")]
    DanglingProduction(u64),
}

/// The persistence collaborator failed to read or write session state.
/// Store state is unchanged when this surfaces.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read session file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write session file {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("session file {path} is not valid JSON")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode session state")]
    Encode(#[source] serde_json::Error),
}

/// A tabular import could not be parsed. Nothing is committed to the
/// store when this surfaces.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read sheet {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("sheet has no header row")]
    MissingHeader,
    #[error("sheet is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: {message}")]
    Malformed { row: usize, message: String },
}

/// A tabular export could not be written.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write sheet {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
