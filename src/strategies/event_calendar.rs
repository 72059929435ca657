use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::domain::{EventSelectors, Item, SourceConfig};
use crate::errors::ScrapeResult;
use crate::fetch::PageFetcher;
use crate::strategies::html::{self, element_text, select_first};
use crate::strategies::normalize::{self, truncate_chars, FALLBACK_TITLE_LIMIT};
use crate::strategies::{calendar, resolver};

pub const MAX_EVENTS: usize = 10;
pub const EVENT_ICS_LIMIT: usize = 1000;

/// Follow each listed event to its detail page and pull the calendar file
/// linked from there. Events without a reachable calendar are left out.
pub fn follow_event_then_download_ics(
    source: &SourceConfig,
    list_url: &str,
    selectors: &EventSelectors,
    fetcher: &dyn PageFetcher,
) -> ScrapeResult<Vec<Item>> {
    let item_selector = html::selector(&selectors.item)?;
    let link_selector = html::selector(&selectors.link)?;
    let title_selector = selectors.title.as_deref().map(html::selector).transpose()?;
    let ics_selector = selectors.ics_link.as_deref().map(html::selector).transpose()?;

    let page = fetcher.fetch(list_url)?;

    let events: Vec<(String, String)> = {
        let document = Html::parse_document(&page.body);
        document
            .select(&item_selector)
            .take(MAX_EVENTS)
            .filter_map(|event| {
                let Some(link) = select_first(&event, &link_selector) else {
                    debug!(source = %source.id, "Event without detail link");
                    return None;
                };
                let event_url = resolver::resolve(html::href(&link)?, list_url).ok()?;

                let title = title_selector
                    .as_ref()
                    .and_then(|s| select_first(&event, s))
                    .map(|t| element_text(&t))
                    .filter(|t| !t.is_empty())
                    .or_else(|| Some(element_text(&link)).filter(|t| !t.is_empty()))
                    .unwrap_or_else(|| truncate_chars(&element_text(&event), FALLBACK_TITLE_LIMIT));

                Some((event_url, title))
            })
            .collect()
    };

    let mut items = Vec::new();
    for (event_url, title) in events {
        let Some(ics_url) = find_calendar_link(fetcher, &event_url, ics_selector.as_ref()) else {
            debug!(source = %source.id, event_url = %event_url, "No calendar link on event page");
            continue;
        };

        let Some(ics_data) = calendar::download(fetcher, &ics_url) else {
            continue;
        };

        if let Some(item) =
            normalize::calendar(source, &title, &event_url, ics_url, &ics_data, EVENT_ICS_LIMIT)
        {
            items.push(item);
        }
    }

    Ok(items)
}

/// Calendar link on an event detail page: the configured selector first,
/// then any anchor that looks like a calendar file.
fn find_calendar_link(
    fetcher: &dyn PageFetcher,
    event_url: &str,
    ics_selector: Option<&Selector>,
) -> Option<String> {
    let page = match fetcher.fetch(event_url) {
        Ok(page) => page,
        Err(e) => {
            warn!(event_url, "Event page fetch failed: {}", e);
            return None;
        }
    };
    let document = Html::parse_document(&page.body);

    let configured = ics_selector
        .and_then(|s| document.select(s).next())
        .and_then(|e| html::href(&e).map(str::to_string));

    let href = configured.or_else(|| {
        html::anchors(&document)
            .into_iter()
            .map(|(href, _)| href)
            .find(|href| calendar::looks_like_calendar_href(href))
    })?;

    resolver::resolve(&href, event_url).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Strategy;
    use crate::errors::ScrapeError;
    use crate::fetch::{FetchedPage, MockPageFetcher};

    const LIST_URL: &str = "https://library.example.gov/events/";
    const ICS: &str = "BEGIN:VCALENDAR\nVERSION:2.0\nBEGIN:VEVENT\nSUMMARY:Story time\nEND:VEVENT\nEND:VCALENDAR";

    fn selectors(ics_link: Option<&str>) -> EventSelectors {
        EventSelectors {
            item: ".event".to_string(),
            link: "a.details".to_string(),
            title: Some(".event-title".to_string()),
            ics_link: ics_link.map(str::to_string),
        }
    }

    fn source(selectors: EventSelectors) -> SourceConfig {
        SourceConfig::new(
            "library_events",
            "Library Events",
            "events",
            Strategy::EventCalendar {
                list_url: LIST_URL.to_string(),
                selectors,
            },
        )
    }

    fn page(url: &str, body: &str) -> FetchedPage {
        FetchedPage::new(url, body)
    }

    #[test]
    fn test_follows_events_to_calendar_files() {
        let list = r#"
            <div class="event"><span class="event-title">Story time</span><a class="details" href="1">Details</a></div>
            <div class="event"><span class="event-title">No link here</span></div>
            <div class="event"><a class="details" href="/events/2">Chess club</a></div>
            <div class="event"><span class="event-title">No calendar</span><a class="details" href="3">Details</a></div>
        "#;

        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == LIST_URL)
            .returning(move |url| Ok(page(url, list)));
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://library.example.gov/events/1")
            .returning(|url| Ok(page(url, r#"<a href="/cal/1.ics">Add to calendar</a>"#)));
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://library.example.gov/events/2")
            .returning(|url| {
                Ok(page(url, r#"<a class="export" href="export?format=iCal">Export</a>"#))
            });
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://library.example.gov/events/3")
            .returning(|url| Ok(page(url, r#"<a href="/contact">Contact</a>"#)));
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://library.example.gov/cal/1.ics")
            .returning(|url| Ok(page(url, ICS).with_content_type("text/calendar")));
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://library.example.gov/events/export?format=iCal")
            .returning(|url| Ok(page(url, ICS)));

        let sel = selectors(None);
        let items =
            follow_event_then_download_ics(&source(sel.clone()), LIST_URL, &sel, &fetcher).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Story time");
        assert_eq!(items[0].url.as_deref(), Some("https://library.example.gov/events/1"));
        assert_eq!(items[0].ics_url.as_deref(), Some("https://library.example.gov/cal/1.ics"));
        assert_eq!(items[0].ics_data.as_deref(), Some(ICS));
        assert_eq!(items[1].title, "Chess club");
        assert_eq!(
            items[1].ics_url.as_deref(),
            Some("https://library.example.gov/events/export?format=iCal")
        );
    }

    #[test]
    fn test_configured_ics_selector_preferred() {
        let list = r#"<div class="event"><span class="event-title">Board meeting</span><a class="details" href="https://library.example.gov/e/9">x</a></div>"#;
        let detail = r#"<a href="/decoy.ics">Other</a><a class="ics" href="/real.ics">Ours</a>"#;

        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == LIST_URL)
            .returning(move |url| Ok(page(url, list)));
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://library.example.gov/e/9")
            .returning(move |url| Ok(page(url, detail)));
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://library.example.gov/real.ics")
            .returning(|url| Ok(page(url, ICS)));
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://library.example.gov/decoy.ics")
            .never();

        let sel = selectors(Some("a.ics"));
        let items =
            follow_event_then_download_ics(&source(sel.clone()), LIST_URL, &sel, &fetcher).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].ics_url.as_deref(), Some("https://library.example.gov/real.ics"));
    }

    #[test]
    fn test_non_calendar_download_rejected_and_truncated_otherwise() {
        let list = r#"
            <div class="event"><span class="event-title">A</span><a class="details" href="a">x</a></div>
            <div class="event"><span class="event-title">B</span><a class="details" href="b">x</a></div>
        "#;
        let long_ics = format!("BEGIN:VCALENDAR\n{}", "X".repeat(5000));

        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == LIST_URL)
            .returning(move |url| Ok(page(url, list)));
        fetcher
            .expect_fetch()
            .withf(|url| url.ends_with("/events/a") || url.ends_with("/events/b"))
            .returning(|url| {
                let ics = if url.ends_with("/a") { "a.ics" } else { "b.ics" };
                Ok(page(url, &format!(r#"<a href="{}">ics</a>"#, ics)))
            });
        fetcher
            .expect_fetch()
            .withf(|url| url.ends_with("/events/a.ics"))
            .returning(|url| {
                Ok(page(url, "<html>login required</html>").with_content_type("text/html"))
            });
        fetcher
            .expect_fetch()
            .withf(|url| url.ends_with("/events/b.ics"))
            .returning(move |url| Ok(page(url, &long_ics)));

        let sel = selectors(None);
        let items =
            follow_event_then_download_ics(&source(sel.clone()), LIST_URL, &sel, &fetcher).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "B");
        assert_eq!(items[0].ics_data.as_ref().unwrap().len(), EVENT_ICS_LIMIT);
    }

    #[test]
    fn test_at_most_ten_events_followed() {
        let list: String = (0..14)
            .map(|i| {
                format!(
                    r#"<div class="event"><a class="details" href="e{}">Event {}</a></div>"#,
                    i, i
                )
            })
            .collect();

        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == LIST_URL)
            .returning(move |url| Ok(page(url, &list)));
        fetcher
            .expect_fetch()
            .withf(|url| url != LIST_URL)
            .times(10)
            .returning(|url| Ok(page(url, "<p>nothing</p>")));

        let sel = selectors(None);
        let items =
            follow_event_then_download_ics(&source(sel.clone()), LIST_URL, &sel, &fetcher).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_list_failure_is_error() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().returning(|url| {
            Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: 503,
            })
        });

        let sel = selectors(None);
        let result = follow_event_then_download_ics(&source(sel.clone()), LIST_URL, &sel, &fetcher);
        assert!(result.is_err());
    }
}
