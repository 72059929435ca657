pub mod resolver;
pub mod html;
pub mod syndication;
pub mod normalize;
pub mod calendar;
pub mod rss_discovery;
pub mod list_scrape;
pub mod event_calendar;
pub mod calendar_subscription;

pub use resolver::resolve;

use tracing::warn;

use crate::domain::{Item, SourceConfig, Strategy};
use crate::errors::{ScrapeError, ScrapeResult};
use crate::fetch::PageFetcher;
use crate::services::DebugCapture;

/// Run the strategy `source` is configured with.
///
/// Unrecognized strategies produce no items rather than an error.
pub fn execute(
    source: &SourceConfig,
    fetcher: &dyn PageFetcher,
    capture: &dyn DebugCapture,
) -> ScrapeResult<Vec<Item>> {
    match &source.strategy {
        Strategy::DiscoverRss { discovery_url } => {
            rss_discovery::discover_rss_on_page(source, discovery_url, fetcher)
        }
        Strategy::ScrapeList {
            list_url,
            selectors,
        } => list_scrape::scrape_list(source, list_url, selectors, fetcher, capture),
        Strategy::EventCalendar {
            list_url,
            selectors,
        } => event_calendar::follow_event_then_download_ics(source, list_url, selectors, fetcher),
        Strategy::CalendarSubscription { discovery_url } => {
            calendar_subscription::discover_ics_subscribe_link(source, discovery_url, fetcher)
        }
        Strategy::Misconfigured { name, reason } => Err(ScrapeError::Config(format!(
            "{} source '{}': {}",
            name, source.id, reason
        ))),
        Strategy::Unrecognized { name } => {
            warn!(source = %source.id, strategy = %name, "Unknown strategy");
            Ok(Vec::new())
        }
    }
}
