use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One line of the live JSON-lines feed.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Message {
    pub author: Option<String>,
    pub timestamp: Option<String>,
    pub category: Option<String>,
    pub sentiment: f64,
    pub keyword_mentioned: Option<String>,
    pub message_length: i64,
    pub message: Option<String>,
}

impl Message {
    /// Identifier used to recognise a message already processed.
    pub fn key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.author.as_deref().unwrap_or_default(),
            self.timestamp.as_deref().unwrap_or_default(),
            self.message.as_deref().unwrap_or_default()
        )
    }

    pub fn preview(&self, max_chars: usize) -> String {
        self.message
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(max_chars)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EngagementLevel {
    High,
    Medium,
    Low,
    VeryLow,
}

impl EngagementLevel {
    pub const ALL: [EngagementLevel; 4] = [
        EngagementLevel::High,
        EngagementLevel::Medium,
        EngagementLevel::Low,
        EngagementLevel::VeryLow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EngagementLevel::High => "High",
            EngagementLevel::Medium => "Medium",
            EngagementLevel::Low => "Low",
            EngagementLevel::VeryLow => "VeryLow",
        }
    }
}

impl fmt::Display for EngagementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngagementLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EngagementLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == value)
            .ok_or_else(|| format!("unknown engagement level: {value}"))
    }
}

/// Insight derived from a message, ready to be appended to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementInsight {
    pub author: Option<String>,
    pub timestamp: Option<String>,
    pub category: Option<String>,
    pub sentiment: f64,
    pub message_length: i64,
    pub engagement_score: f64,
    pub engagement_level: EngagementLevel,
    pub message_key: String,
}

/// A row read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightRecord {
    pub id: i64,
    pub author: Option<String>,
    pub timestamp: Option<String>,
    pub category: Option<String>,
    pub sentiment: f64,
    pub message_length: i64,
    pub engagement_score: f64,
    pub engagement_level: EngagementLevel,
    pub message_key: Option<String>,
    pub processed_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct LevelSummary {
    pub level: EngagementLevel,
    pub count: usize,
    pub avg_score: f64,
}

#[derive(Debug, Clone)]
pub struct AuthorSummary {
    pub author: String,
    pub insight_count: usize,
    pub avg_score: f64,
}
