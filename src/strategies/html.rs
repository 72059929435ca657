use scraper::{ElementRef, Html, Selector};

use crate::errors::{ScrapeError, ScrapeResult};

pub fn selector(raw: &str) -> ScrapeResult<Selector> {
    Selector::parse(raw).map_err(|e| ScrapeError::Selector(format!("'{}': {}", raw, e)))
}

/// Visible text of an element with whitespace collapsed.
pub fn element_text(element: &ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First descendant of `element` matching `selector`.
pub fn select_first<'a>(element: &ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

/// Non-empty `href` of an element.
pub fn href<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    element
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|h| !h.is_empty())
}

/// `(href, text)` for every `<a href>` in document order.
pub fn anchors(document: &Html) -> Vec<(String, String)> {
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&anchor)
        .filter_map(|a| href(&a).map(|h| (h.to_string(), element_text(&a))))
        .collect()
}

/// Push `url` unless already present; order of first sight is kept.
pub fn push_distinct(urls: &mut Vec<String>, url: String) {
    if !urls.contains(&url) {
        urls.push(url);
    }
}
