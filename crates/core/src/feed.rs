use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entry parsed from the feed document, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub link: String,
    pub title: String,
}

impl FeedItem {
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self { link: link.into(), title: title.into() }
    }

    /// Builds an item from the raw fields of a feed entry.
    ///
    /// Returns `None` when the entry has no usable link. The title falls back to the
    /// description, then to the link itself.
    pub fn from_parts(
        link: Option<&str>,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Option<Self> {
        let link = link.map(str::trim).filter(|l| !l.is_empty())?;
        let title = [title, description]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .unwrap_or(link);
        Some(Self::new(link, title))
    }

    pub fn to_new_entry(&self) -> NewFeedEntry {
        NewFeedEntry { link: self.link.clone(), title: self.title.clone() }
    }
}

/// A persisted feed entry. `link` is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: i64,
    pub link: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFeedEntry {
    pub link: String,
    pub title: String,
}

/// A hyperlink scraped from the page behind a feed entry.
///
/// Carries a denormalized copy of the parent entry's link and title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub id: i64,
    pub feed_link: String,
    pub feed_title: String,
    pub page_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPageLink {
    pub feed_link: String,
    pub feed_title: String,
    pub page_link: String,
}

impl NewPageLink {
    pub fn for_entry(feed_link: &str, feed_title: &str, links: &[String]) -> Vec<Self> {
        links
            .iter()
            .map(|page_link| Self {
                feed_link: feed_link.to_owned(),
                feed_title: feed_title.to_owned(),
                page_link: page_link.clone(),
            })
            .collect()
    }
}
