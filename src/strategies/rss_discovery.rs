use scraper::Html;
use tracing::{debug, warn};

use crate::domain::{Item, SourceConfig};
use crate::errors::ScrapeResult;
use crate::fetch::PageFetcher;
use crate::strategies::html::{self, push_distinct};
use crate::strategies::{normalize, resolver, syndication};

pub const MAX_FEEDS: usize = 3;
pub const MAX_ENTRIES_PER_FEED: usize = 10;

/// Find feed links on `discovery_url` and normalize their newest entries.
pub fn discover_rss_on_page(
    source: &SourceConfig,
    discovery_url: &str,
    fetcher: &dyn PageFetcher,
) -> ScrapeResult<Vec<Item>> {
    let page = fetcher.fetch(discovery_url)?;
    let feed_urls = feed_candidates(&page.body, discovery_url);
    debug!(source = %source.id, candidates = feed_urls.len(), "Discovered feed links");

    let mut items = Vec::new();
    for feed_url in feed_urls.iter().take(MAX_FEEDS) {
        let feed = match fetcher.fetch(feed_url) {
            Ok(feed) => feed,
            Err(e) => {
                warn!(source = %source.id, feed_url = %feed_url, "Feed fetch failed: {}", e);
                continue;
            }
        };

        let entries = match syndication::parse_entries(&feed.bytes) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(source = %source.id, feed_url = %feed_url, "Skipping feed: {}", e);
                continue;
            }
        };

        items.extend(
            entries
                .into_iter()
                .take(MAX_ENTRIES_PER_FEED)
                .filter_map(|entry| normalize::feed_entry(source, entry, feed_url)),
        );
    }

    Ok(items)
}

/// Absolute feed URLs in page order: anchors first, then
/// `<link type="application/rss+xml">` elements.
fn feed_candidates(body: &str, base: &str) -> Vec<String> {
    let document = Html::parse_document(body);
    let mut candidates = Vec::new();

    for (href, _) in html::anchors(&document) {
        if is_feed_href(&href) {
            if let Ok(url) = resolver::resolve(&href, base) {
                push_distinct(&mut candidates, url);
            }
        }
    }

    if let Ok(link) = html::selector(r#"link[type="application/rss+xml"][href]"#) {
        for element in document.select(&link) {
            if let Some(href) = html::href(&element) {
                if let Ok(url) = resolver::resolve(href, base) {
                    push_distinct(&mut candidates, url);
                }
            }
        }
    }

    candidates
}

fn is_feed_href(href: &str) -> bool {
    let href = href.to_lowercase();
    href.contains("rss") || href.contains("feed") || href.ends_with(".xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Strategy;
    use crate::errors::ScrapeError;
    use crate::fetch::{FetchedPage, MockPageFetcher};

    fn source() -> SourceConfig {
        SourceConfig::new(
            "council_news",
            "County Council",
            "government",
            Strategy::DiscoverRss {
                discovery_url: "https://council.example.gov/news/".to_string(),
            },
        )
    }

    fn rss_with(count: usize) -> String {
        let items: String = (0..count)
            .map(|i| {
                format!(
                    "<item><title>Release {i}</title><link>https://council.example.gov/n/{i}</link><guid>{i}</guid></item>"
                )
            })
            .collect();
        format!(r#"<?xml version="1.0"?><rss version="2.0"><channel><title>T</title>{items}</channel></rss>"#)
    }

    #[test]
    fn test_candidates_from_anchors_and_link_tags() {
        let body = r#"<html><head>
            <link rel="alternate" type="application/rss+xml" href="/news/rss.xml">
            </head><body>
            <a href="/about">About</a>
            <a href="press/RSS">Press RSS</a>
            <a href="https://other.example.gov/data.XML">Data</a>
            <a href="/news/rss.xml">Duplicate</a>
            <a href="/newsfeed">Feed</a>
            </body></html>"#;

        let candidates = feed_candidates(body, "https://council.example.gov/news/");

        assert_eq!(
            candidates,
            vec![
                "https://council.example.gov/news/press/RSS",
                "https://other.example.gov/data.XML",
                "https://council.example.gov/news/rss.xml",
                "https://council.example.gov/newsfeed",
            ]
        );
    }

    #[test]
    fn test_at_most_three_feeds_and_ten_entries() {
        let page = r#"<a href="/a.xml">a</a><a href="/b.xml">b</a><a href="/c.xml">c</a><a href="/d.xml">d</a>"#;

        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://council.example.gov/news/")
            .times(1)
            .returning(move |url| Ok(FetchedPage::new(url, page)));
        fetcher
            .expect_fetch()
            .withf(|url| url.ends_with(".xml") && !url.ends_with("/d.xml"))
            .times(3)
            .returning(|url| Ok(FetchedPage::new(url, rss_with(15))));
        fetcher
            .expect_fetch()
            .withf(|url| url.ends_with("/d.xml"))
            .never();

        let items =
            discover_rss_on_page(&source(), "https://council.example.gov/news/", &fetcher).unwrap();

        assert_eq!(items.len(), 30);
        assert_eq!(items[0].title, "Release 0");
        assert_eq!(items[0].feed_url.as_deref(), Some("https://council.example.gov/a.xml"));
        assert_eq!(items[10].feed_url.as_deref(), Some("https://council.example.gov/b.xml"));
        assert!(items.iter().all(|i| !i.title.is_empty()));
    }

    #[test]
    fn test_broken_feed_skipped() {
        let page = r#"<a href="/broken.xml">a</a><a href="/gone/rss">b</a><a href="/ok.xml">c</a>"#;

        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://council.example.gov/news/")
            .returning(move |url| Ok(FetchedPage::new(url, page)));
        fetcher
            .expect_fetch()
            .withf(|url| url.ends_with("/broken.xml"))
            .returning(|url| Ok(FetchedPage::new(url, "<html>nope</html>")));
        fetcher
            .expect_fetch()
            .withf(|url| url.ends_with("/gone/rss"))
            .returning(|url| {
                Err(ScrapeError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                })
            });
        fetcher
            .expect_fetch()
            .withf(|url| url.ends_with("/ok.xml"))
            .returning(|url| Ok(FetchedPage::new(url, rss_with(2))));

        let items =
            discover_rss_on_page(&source(), "https://council.example.gov/news/", &fetcher).unwrap();

        assert_eq!(items.len(), 2);
        assert!(items
            .iter()
            .all(|i| i.feed_url.as_deref() == Some("https://council.example.gov/ok.xml")));
    }

    #[test]
    fn test_discovery_page_failure_is_error() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().returning(|url| {
            Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: 500,
            })
        });

        let result = discover_rss_on_page(&source(), "https://council.example.gov/news/", &fetcher);
        assert!(matches!(result, Err(ScrapeError::HttpStatus { status: 500, .. })));
    }

    #[test]
    fn test_page_without_feeds_yields_nothing() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|url| Ok(FetchedPage::new(url, "<p>No feeds</p>")));

        let items =
            discover_rss_on_page(&source(), "https://council.example.gov/news/", &fetcher).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_feed_parsed_from_raw_bytes() {
        let page = r#"<a href="/latin1.xml">Feed</a>"#;
        let feed = br#"<?xml version="1.0"?><rss version="2.0"><channel><title>T</title><item><title>Water main repair</title><guid>1</guid><pubDate>March 3, 2024</pubDate></item></channel></rss>"#;

        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://council.example.gov/news/")
            .returning(move |url| Ok(FetchedPage::new(url, page)));
        fetcher
            .expect_fetch()
            .withf(|url| url.ends_with("/latin1.xml"))
            .returning(move |url| {
                let mut fetched = FetchedPage::new(url, "mis-decoded text");
                fetched.bytes = feed.to_vec();
                Ok(fetched)
            });

        let items =
            discover_rss_on_page(&source(), "https://council.example.gov/news/", &fetcher).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Water main repair");
        assert_eq!(items[0].published.as_deref(), Some("March 3, 2024"));
    }
}
