use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::ConsumerError;
use crate::models::Message;

/// Latest message in the feed, or `None` if there is nothing usable.
///
/// Parse and read failures are logged and reported as `None`.
pub async fn read_latest(path: &Path) -> Option<Message> {
    match try_read_latest(path).await {
        Ok(message) => message,
        Err(err @ ConsumerError::Parse { .. }) => {
            warn!(error = %err, "error decoding JSON");
            None
        }
        Err(err) => {
            warn!(error = %err, "error reading data file");
            None
        }
    }
}

/// Reads the whole file and parses its last non-empty line.
pub async fn try_read_latest(path: &Path) -> Result<Option<Message>, ConsumerError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "data file does not exist yet");
            return Ok(None);
        }
        Err(source) => {
            return Err(ConsumerError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let Some(line) = contents.lines().map(str::trim).rev().find(|line| !line.is_empty()) else {
        return Ok(None);
    };

    serde_json::from_str(line)
        .map(Some)
        .map_err(|source| ConsumerError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
