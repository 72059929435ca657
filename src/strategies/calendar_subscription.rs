use scraper::Html;
use tracing::debug;

use crate::domain::{Item, SourceConfig};
use crate::errors::ScrapeResult;
use crate::fetch::PageFetcher;
use crate::strategies::html::{self, push_distinct};
use crate::strategies::{calendar, normalize, resolver};

pub const MAX_CALENDARS: usize = 2;
pub const SUBSCRIPTION_ICS_LIMIT: usize = 2000;

pub fn discover_ics_subscribe_link(
    source: &SourceConfig,
    discovery_url: &str,
    fetcher: &dyn PageFetcher,
) -> ScrapeResult<Vec<Item>> {
    let page = fetcher.fetch(discovery_url)?;
    let candidates = subscription_candidates(&page.body, discovery_url);
    debug!(source = %source.id, candidates = candidates.len(), "Discovered calendar links");

    let title = format!("Calendar: {}", source.name);

    let items = candidates
        .into_iter()
        .take(MAX_CALENDARS)
        .filter_map(|ics_url| {
            let ics_data = calendar::download(fetcher, &ics_url)?;
            normalize::calendar(
                source,
                &title,
                discovery_url,
                ics_url,
                &ics_data,
                SUBSCRIPTION_ICS_LIMIT,
            )
        })
        .collect();

    Ok(items)
}

fn subscription_candidates(body: &str, base: &str) -> Vec<String> {
    let document = Html::parse_document(body);
    let mut candidates = Vec::new();

    for (href, text) in html::anchors(&document) {
        let text = text.to_lowercase();
        let is_subscribe_text = text.contains("subscribe") && text.contains("calendar");

        if calendar::looks_like_calendar_href(&href) || is_subscribe_text {
            if let Ok(url) = resolver::resolve(&href, base) {
                push_distinct(&mut candidates, url);
            }
        }
    }

    candidates
}
