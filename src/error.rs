//! Error taxonomy for the consumer.
//!
//! Source errors (`Parse`, `Io`) are recovered inside a poll cycle and only
//! logged. `StorageInit` is fatal at startup. `StorageWrite` is logged and the
//! loop moves on without retrying the message.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsumerError {
    /// The last line of the source file is not a valid message object.
    #[error("failed to parse message in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The source file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to initialize insight store at {location}: {source}")]
    StorageInit {
        location: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to append insight: {0}")]
    StorageWrite(#[source] sqlx::Error),

    #[error("failed to read insights: {0}")]
    StorageRead(#[source] sqlx::Error),
}
