use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SOURCE_PATH: &str = "data/project_live.json";
pub const DEFAULT_STORE_PATH: &str = "data/engagement_insights.sqlite";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_SEEN_CAPACITY: usize = 1024;

/// Settings handed to the poll loop at construction.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// JSON-lines file to poll.
    pub source_path: PathBuf,
    /// SQLite database file receiving insights.
    pub store_path: PathBuf,
    pub poll_interval: Duration,
    /// Number of message keys remembered for dedup.
    pub seen_capacity: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            seen_capacity: DEFAULT_SEEN_CAPACITY,
        }
    }
}
