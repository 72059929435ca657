use feed_rs::parser;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::{ScrapeError, ScrapeResult};

/// The fields of a feed entry the scraper keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    /// Date text exactly as the feed wrote it.
    pub published: Option<String>,
}

/// Parse RSS, Atom or JSON Feed bytes. An empty feed is `Ok(vec![])`.
pub fn parse_entries(bytes: &[u8]) -> ScrapeResult<Vec<FeedEntry>> {
    let feed = parser::parse(bytes).map_err(|e| ScrapeError::FeedParse(e.to_string()))?;

    // Raw dates line up with feed-rs entries only when both saw the same entries.
    let raw_dates = raw_entry_dates(bytes).filter(|dates| dates.len() == feed.entries.len());
    let mut raw_dates = raw_dates.map(Vec::into_iter);

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let summary = entry
                .summary
                .map(|s| s.content)
                .filter(|s| !s.trim().is_empty())
                .or_else(|| entry.content.and_then(|c| c.body));

            let raw = raw_dates.as_mut().and_then(|dates| dates.next()).flatten();
            let published = raw.or_else(|| {
                entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.to_rfc3339())
            });

            FeedEntry {
                title: entry.title.map(|t| t.content),
                summary,
                link: entry.links.into_iter().next().map(|l| l.href),
                published,
            }
        })
        .collect();

    Ok(entries)
}

/// Date text of every entry in document order, preferring the publication
/// date over the update date. `None` when the document cannot be walked.
fn raw_entry_dates(bytes: &[u8]) -> Option<Vec<Option<String>>> {
    let first = bytes.iter().find(|b| !b.is_ascii_whitespace())?;
    if *first == b'{' {
        json_entry_dates(bytes)
    } else {
        xml_entry_dates(bytes)
    }
}

#[derive(Default)]
struct RawDates {
    published: Option<String>,
    updated: Option<String>,
}

impl RawDates {
    fn slot(&mut self, element: &[u8]) -> Option<&mut Option<String>> {
        match element {
            b"pubDate" | b"published" | b"date" | b"issued" => Some(&mut self.published),
            b"updated" | b"modified" => Some(&mut self.updated),
            _ => None,
        }
    }

    fn finish(self) -> Option<String> {
        self.published
            .or(self.updated)
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
    }
}

fn xml_entry_dates(bytes: &[u8]) -> Option<Vec<Option<String>>> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut dates = Vec::new();
    let mut depth = 0usize;
    // Depth of the open item/entry element, and the entry's date fields so far.
    let mut entry: Option<(usize, RawDates)> = None;
    let mut current: Option<Vec<u8>> = None;

    loop {
        match reader.read_event_into(&mut buf).ok()? {
            Event::Start(e) => {
                depth += 1;
                let name = e.local_name().as_ref().to_vec();
                match entry.as_ref().map(|(entry_depth, _)| *entry_depth) {
                    None if name == b"item" || name == b"entry" => {
                        entry = Some((depth, RawDates::default()));
                        current = None;
                    }
                    Some(entry_depth) if depth == entry_depth + 1 => current = Some(name),
                    _ => current = None,
                }
            }
            Event::End(_) => {
                if entry.as_ref().is_some_and(|(entry_depth, _)| *entry_depth == depth) {
                    if let Some((_, raw)) = entry.take() {
                        dates.push(raw.finish());
                    }
                }
                current = None;
                depth = depth.saturating_sub(1);
            }
            Event::Text(e) => {
                let text = match e.unescape() {
                    Ok(text) => text.into_owned(),
                    Err(_) => String::from_utf8_lossy(&e).into_owned(),
                };
                push_date_text(&mut entry, current.as_deref(), &text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                push_date_text(&mut entry, current.as_deref(), &text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Some(dates)
}

fn push_date_text(entry: &mut Option<(usize, RawDates)>, element: Option<&[u8]>, text: &str) {
    let (Some((_, raw)), Some(element)) = (entry.as_mut(), element) else {
        return;
    };
    if let Some(slot) = raw.slot(element) {
        slot.get_or_insert_with(String::new).push_str(text);
    }
}

fn json_entry_dates(bytes: &[u8]) -> Option<Vec<Option<String>>> {
    let document: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    let items = document.get("items")?.as_array()?;

    Some(
        items
            .iter()
            .map(|item| {
                item.get("date_published")
                    .or_else(|| item.get("date_modified"))
                    .and_then(|d| d.as_str())
                    .map(str::to_string)
            })
            .collect(),
    )
}
