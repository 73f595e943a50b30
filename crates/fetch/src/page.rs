//! Secondary page fetching and anchor extraction.

use chrono::Utc;
use feedrelay_core::PageSource;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use scraper::{Html, Selector};
use url::Url;

use crate::client::{HttpFetcher, parse_url};
use crate::error::FetchError;

#[derive(Clone, Debug)]
pub struct PageScraper {
    fetcher: HttpFetcher,
    source: PageSource,
}

impl PageScraper {
    #[must_use]
    pub const fn new(fetcher: HttpFetcher, source: PageSource) -> Self {
        Self { fetcher, source }
    }

    /// Fetch the page behind `link` and return every anchor href, in document order.
    ///
    /// # Errors
    /// Returns an error if the page URL cannot be built or the request fails.
    pub async fn scrape(&self, link: &str) -> Result<Vec<String>, FetchError> {
        let (url, headers) = match &self.source {
            PageSource::Direct => (parse_url(link)?, HeaderMap::new()),
            PageSource::DownloadEndpoint { site_base, endpoint } => {
                download_request(site_base, endpoint, link)?
            },
        };
        let html = self.fetcher.get_text(&url, headers).await?;
        let links = extract_links(&html, Some(&url));
        tracing::debug!(%link, found = links.len(), "scraped page");
        Ok(links)
    }
}

/// Builds the AJAX request the site's download button makes.
fn download_request(
    site_base: &str,
    endpoint: &str,
    link: &str,
) -> Result<(Url, HeaderMap), FetchError> {
    let page_id = link.strip_prefix(site_base).unwrap_or(link);

    let mut url = parse_url(endpoint)?;
    url.query_pairs_mut()
        .append_pair("id", page_id)
        .append_pair("_", &Utc::now().timestamp_millis().to_string());

    let referer = format!("{site_base}{page_id}");
    let referer_value = HeaderValue::from_str(&referer)
        .map_err(|e| FetchError::InvalidUrl { url: referer.clone(), reason: e.to_string() })?;
    let mut headers = HeaderMap::new();
    headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
    headers.insert(REFERER, referer_value);
    Ok((url, headers))
}

/// Every non-empty anchor `href` in `html`, in document order, duplicates kept.
///
/// Relative hrefs are resolved against `base` when one is given; absolute ones
/// are returned untouched.
#[must_use]
pub fn extract_links(html: &str, base: Option<&Url>) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&anchors)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| resolve(base, href))
        .collect()
}

fn resolve(base: Option<&Url>, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_owned();
    }
    base.and_then(|b| b.join(href).ok()).map_or_else(|| href.to_owned(), |u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_document_order_and_duplicates() {
        let html = r#"<div>
            <a href="https://files.test/b.zip">B</a>
            <p><a href="https://mirror.test/a.zip">A</a></p>
            <a href="https://files.test/b.zip">B again</a>
        </div>"#;
        assert_eq!(
            extract_links(html, None),
            ["https://files.test/b.zip", "https://mirror.test/a.zip", "https://files.test/b.zip"]
        );
    }

    #[test]
    fn skips_anchors_without_href() {
        let html = r#"<a name="top">top</a><a href="">empty</a><a href="  ">blank</a><a href="x">x</a>"#;
        assert_eq!(extract_links(html, None), ["x"]);
    }

    #[test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    fn resolves_relative_hrefs_against_base() {
        let base = Url::parse("https://site.test/music/page?id=1").unwrap();
        let html = r#"<a href="/dl/1.zip">abs path</a><a href="2.zip">rel</a><a href="https://cdn.test">cdn</a>"#;
        assert_eq!(
            extract_links(html, Some(&base)),
            ["https://site.test/dl/1.zip", "https://site.test/music/2.zip", "https://cdn.test"]
        );
    }

    #[test]
    fn fragment_without_anchors_is_empty() {
        assert!(extract_links("<p>No downloads yet</p>", None).is_empty());
        assert!(extract_links("", None).is_empty());
    }

    #[test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    fn download_request_strips_site_base() {
        let (url, headers) = download_request(
            "https://site.test/",
            "https://site.test/music.php?task=getdownloadlink",
            "https://site.test/artist-album-2024",
        )
        .unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("task".to_owned(), "getdownloadlink".to_owned()));
        assert_eq!(pairs[1], ("id".to_owned(), "artist-album-2024".to_owned()));
        assert_eq!(pairs[2].0, "_");
        assert_eq!(headers.get("X-Requested-With").unwrap(), "XMLHttpRequest");
        assert_eq!(headers.get(REFERER).unwrap(), "https://site.test/artist-album-2024");
    }

    #[test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    fn download_request_keeps_foreign_link_whole() {
        let (url, _) = download_request(
            "https://site.test/",
            "https://site.test/music.php",
            "https://elsewhere.test/x",
        )
        .unwrap();
        assert!(url.query_pairs().any(|(k, v)| k == "id" && v == "https://elsewhere.test/x"));
    }
}
