use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ParseEnumError;

/// A unit of work for one pipeline step.
///
/// Serialized with an internal `kind` tag; the same JSON is stored in the task queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Task {
    /// Fetch the feed and run the dedup/insert step on every entry.
    PollFeed { feed_url: String },
    /// Scrape the page behind a newly inserted feed entry.
    ScrapePage { feed_link: String, feed_title: String },
    /// Post a formatted message to the messaging channel.
    SendNotification { message: String },
}

impl Task {
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        match *self {
            Self::PollFeed { .. } => TaskKind::PollFeed,
            Self::ScrapePage { .. } => TaskKind::ScrapePage,
            Self::SendNotification { .. } => TaskKind::SendNotification,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    PollFeed,
    ScrapePage,
    SendNotification,
}

impl TaskKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::PollFeed => "poll_feed",
            Self::ScrapePage => "scrape_page",
            Self::SendNotification => "send_notification",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poll_feed" => Ok(Self::PollFeed),
            "scrape_page" => Ok(Self::ScrapePage),
            "send_notification" => Ok(Self::SendNotification),
            _ => Err(ParseEnumError::new("task kind", s)),
        }
    }
}
