//! Fetching side of the pipeline: feed documents and the pages behind them.

mod client;
mod error;
mod feed;
mod page;

pub use client::HttpFetcher;
pub use error::FetchError;
pub use feed::{FeedClient, parse_feed};
pub use page::{PageScraper, extract_links};
