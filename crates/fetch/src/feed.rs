use feedrelay_core::FeedItem;
use reqwest::header::HeaderMap;

use crate::client::{HttpFetcher, parse_url};
use crate::error::FetchError;

/// Feed fetcher client
#[derive(Clone, Debug)]
pub struct FeedClient {
    fetcher: HttpFetcher,
}

impl FeedClient {
    #[must_use]
    pub const fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch and parse a feed.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid, the request fails, or the body is
    /// neither RSS nor Atom.
    pub async fn fetch(&self, feed_url: &str) -> Result<Vec<FeedItem>, FetchError> {
        let url = parse_url(feed_url)?;
        tracing::debug!("Fetching feed from: {}", url);

        let body = self.fetcher.get_text(&url, HeaderMap::new()).await?;
        let items = parse_feed(body.as_bytes())?;

        tracing::debug!("Parsed {} items from feed", items.len());
        Ok(items)
    }
}

/// Parse an RSS 2.0 document, falling back to Atom.
///
/// Entries without a link are dropped.
///
/// # Errors
/// Returns `FetchError::Parse` if the document is neither format.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<FeedItem>, FetchError> {
    let rss_err = match rss::Channel::read_from(xml) {
        Ok(channel) => return Ok(rss_items(&channel)),
        Err(e) => e,
    };
    match atom_syndication::Feed::read_from(xml) {
        Ok(feed) => Ok(atom_items(&feed)),
        Err(atom_err) => {
            Err(FetchError::Parse(format!("not an RSS feed ({rss_err}) nor Atom ({atom_err})")))
        },
    }
}

fn rss_items(channel: &rss::Channel) -> Vec<FeedItem> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let parsed = FeedItem::from_parts(item.link(), item.title(), item.description());
            if parsed.is_none() {
                tracing::debug!(title = ?item.title(), "skipping RSS item without link");
            }
            parsed
        })
        .collect()
}

fn atom_items(feed: &atom_syndication::Feed) -> Vec<FeedItem> {
    feed.entries()
        .iter()
        .filter_map(|entry| {
            let link = entry
                .links()
                .iter()
                .find(|l| l.rel() == "alternate")
                .or_else(|| entry.links().first())
                .map(atom_syndication::Link::href);
            let summary = entry.summary().map(|s| s.value.as_str());
            let parsed = FeedItem::from_parts(link, Some(entry.title().value.as_str()), summary);
            if parsed.is_none() {
                tracing::debug!(id = entry.id(), "skipping Atom entry without link");
            }
            parsed
        })
        .collect()
}
