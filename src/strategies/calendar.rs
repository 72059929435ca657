use tracing::{debug, warn};

use crate::fetch::PageFetcher;

pub const VCALENDAR_MARKER: &str = "BEGIN:VCALENDAR";

/// Calendar content is either declared `text/calendar` or sniffed by marker.
pub fn is_calendar(content_type: Option<&str>, body: &str) -> bool {
    let declared = content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with("text/calendar"))
        .unwrap_or(false);

    declared || body.contains(VCALENDAR_MARKER)
}

/// Href looks like a calendar file: `.ics` anywhere, or `ical` in any case.
pub fn looks_like_calendar_href(href: &str) -> bool {
    href.contains(".ics") || href.to_lowercase().contains("ical")
}

/// `webcal://` is a subscription alias for https.
pub fn fetchable_url(url: &str) -> String {
    match url.get(..9) {
        Some(prefix) if prefix.eq_ignore_ascii_case("webcal://") => {
            format!("https://{}", &url[9..])
        }
        _ => url.to_string(),
    }
}

/// Fetch `url` and return its body when it validates as calendar data.
/// Fetch failures and non-calendar content both come back as `None`.
pub fn download(fetcher: &dyn PageFetcher, url: &str) -> Option<String> {
    let page = match fetcher.fetch(&fetchable_url(url)) {
        Ok(page) => page,
        Err(e) => {
            warn!(url, "Calendar download failed: {}", e);
            return None;
        }
    };

    if is_calendar(page.content_type.as_deref(), &page.body) {
        Some(page.body)
    } else {
        debug!(url, content_type = ?page.content_type, "Not calendar content");
        None
    }
}
