//! Error types for job sets.

use std::io;
use std::path::PathBuf;

/// Errors raised while building, reading or writing a job set.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Two jobs were registered under the same identifier.
    #[error("Duplicate job id: {0}")]
    DuplicateId(String),

    /// A job was built without any sources.
    #[error("Job {0} has no sources")]
    NoSources(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported schema version {found} (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },
}
