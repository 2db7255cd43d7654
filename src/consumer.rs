use std::future::Future;

use tracing::{error, info};

use crate::config::ConsumerConfig;
use crate::db::InsightStore;
use crate::error::ConsumerError;
use crate::models::EngagementInsight;
use crate::seen::SeenCache;
use crate::source;

const PREVIEW_CHARS: usize = 50;

/// Result of a single poll.
#[derive(Debug)]
pub enum PollOutcome {
    Stored { id: i64, insight: EngagementInsight },
    Duplicate,
    Waiting,
    WriteFailed,
}

pub struct PollLoop {
    config: ConsumerConfig,
    store: InsightStore,
    seen: SeenCache,
}

impl PollLoop {
    /// Initialize the store and seed the seen cache from its newest rows.
    pub async fn new(config: ConsumerConfig) -> Result<Self, ConsumerError> {
        let store = InsightStore::initialize(&config.store_path).await?;
        info!(path = %config.store_path.display(), "database initialized");
        let mut seen = SeenCache::new(config.seen_capacity);

        // Oldest first, so the newest keys survive eviction.
        let keys = store.recent_keys(seen.capacity()).await?;
        for key in keys.into_iter().rev() {
            seen.insert(key);
        }
        info!(seeded = seen.len(), "seen cache restored from store");

        Ok(Self {
            config,
            store,
            seen,
        })
    }

    #[cfg(test)]
    pub fn store(&self) -> &InsightStore {
        &self.store
    }

    pub async fn poll_once(&mut self) -> PollOutcome {
        let Some(message) = source::read_latest(&self.config.source_path).await else {
            info!("no new messages available, waiting");
            return PollOutcome::Waiting;
        };

        let key = message.key();
        if self.seen.contains(&key) {
            info!("message already processed, skipping");
            return PollOutcome::Duplicate;
        }

        info!(
            author = message.author.as_deref().unwrap_or_default(),
            keyword = message.keyword_mentioned.as_deref().unwrap_or_default(),
            preview = %message.preview(PREVIEW_CHARS),
            "processing message"
        );

        let insight = EngagementInsight::from_message(&message);
        // Marked before the write: a failed append is not retried.
        self.seen.insert(key);

        match self.store.append(&insight).await {
            Ok(id) => {
                info!(
                    id,
                    level = %insight.engagement_level,
                    score = insight.engagement_score,
                    author = insight.author.as_deref().unwrap_or_default(),
                    "stored engagement insight"
                );
                PollOutcome::Stored { id, insight }
            }
            Err(err) => {
                error!(error = %err, "failed to store engagement insight");
                PollOutcome::WriteFailed
            }
        }
    }

    /// Poll until `shutdown` resolves. Shutdown is only observed between polls.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stored = 0usize;

        loop {
            if let PollOutcome::Stored { id, insight } = self.poll_once().await {
                stored += 1;
                info!(
                    id,
                    author = insight.author.as_deref().unwrap_or_default(),
                    "message processed successfully"
                );
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        info!(stored, "consumer shutting down");
    }
}
