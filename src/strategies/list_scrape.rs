use chrono::Utc;
use scraper::Html;
use tracing::warn;

use crate::domain::{Item, ListSelectors, SourceConfig};
use crate::errors::ScrapeResult;
use crate::fetch::PageFetcher;
use crate::services::DebugCapture;
use crate::strategies::html::{self, element_text, select_first};
use crate::strategies::normalize::{self, truncate_chars, ListExtraction, FALLBACK_TITLE_LIMIT};
use crate::strategies::resolver;

pub const MAX_LIST_ITEMS: usize = 20;

/// Scrape a listing page with the configured selectors.
///
/// A page where `selectors.item` matches nothing is captured for selector
/// repair and yields no items; it is not an error.
pub fn scrape_list(
    source: &SourceConfig,
    list_url: &str,
    selectors: &ListSelectors,
    fetcher: &dyn PageFetcher,
    capture: &dyn DebugCapture,
) -> ScrapeResult<Vec<Item>> {
    let item_selector = html::selector(&selectors.item)?;
    let title_selector = selectors.title.as_deref().map(html::selector).transpose()?;
    let link_selector = selectors.link.as_deref().map(html::selector).transpose()?;
    let date_selector = selectors.date.as_deref().map(html::selector).transpose()?;

    let page = fetcher.fetch(list_url)?;
    let document = Html::parse_document(&page.body);

    let elements: Vec<_> = document.select(&item_selector).collect();
    if elements.is_empty() {
        warn!(source = %source.id, selector = %selectors.item, "No items found with selector");
        capture.capture(&source.id, Utc::now(), &page.body);
        return Ok(Vec::new());
    }

    let items = elements
        .iter()
        .take(MAX_LIST_ITEMS)
        .filter_map(|element| {
            let title = title_selector
                .as_ref()
                .and_then(|s| select_first(element, s))
                .map(|t| element_text(&t))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| truncate_chars(&element_text(element), FALLBACK_TITLE_LIMIT));

            let url = link_selector
                .as_ref()
                .and_then(|s| select_first(element, s))
                .and_then(|a| html::href(&a).and_then(|h| resolver::resolve(h, list_url).ok()));

            let date = date_selector
                .as_ref()
                .and_then(|s| select_first(element, s))
                .map(|d| element_text(&d));

            normalize::list_element(source, ListExtraction { title, url, date })
        })
        .collect();

    Ok(items)
}
