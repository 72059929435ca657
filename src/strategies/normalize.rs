use crate::domain::{Item, SourceConfig};
use crate::strategies::syndication::FeedEntry;

pub const DESCRIPTION_LIMIT: usize = 500;
pub const FALLBACK_TITLE_LIMIT: usize = 100;

/// First `max` characters of `text` (char, not byte, boundary).
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

pub fn feed_entry(source: &SourceConfig, entry: FeedEntry, feed_url: &str) -> Option<Item> {
    let title = entry.title.unwrap_or_default();

    Item::new(&source.id, &source.category, &title).map(|item| {
        item.with_description(entry.summary.map(|s| truncate_chars(s.trim(), DESCRIPTION_LIMIT)))
            .with_url(entry.link)
            .with_published(entry.published)
            .with_feed_url(Some(feed_url.to_string()))
    })
}

/// Raw fields pulled from one matched list element.
#[derive(Debug, Default)]
pub struct ListExtraction {
    pub title: String,
    pub url: Option<String>,
    pub date: Option<String>,
}

pub fn list_element(source: &SourceConfig, extraction: ListExtraction) -> Option<Item> {
    Item::new(&source.id, &source.category, &extraction.title).map(|item| {
        item.with_url(extraction.url)
            .with_date(extraction.date.filter(|d| !d.is_empty()))
    })
}

pub fn calendar(
    source: &SourceConfig,
    title: &str,
    page_url: &str,
    ics_url: String,
    ics_data: &str,
    limit: usize,
) -> Option<Item> {
    Item::new(&source.id, &source.category, title).map(|item| {
        item.with_url(Some(page_url.to_string()))
            .with_calendar(ics_url, truncate_chars(ics_data, limit))
    })
}
