use serde::{Deserialize, Serialize};

/// Selectors for the `scrape_list` strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSelectors {
    pub item: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub date: Option<String>,
}

/// Selectors for the `follow_event_then_download_ics` strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSelectors {
    pub item: String,
    pub link: String,
    pub title: Option<String>,
    pub ics_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    DiscoverRss {
        discovery_url: String,
    },
    ScrapeList {
        list_url: String,
        selectors: ListSelectors,
    },
    EventCalendar {
        list_url: String,
        selectors: EventSelectors,
    },
    CalendarSubscription {
        discovery_url: String,
    },
    /// Strategy name this build does not know. Executes to zero items.
    Unrecognized { name: String },
    /// Known strategy missing a required parameter.
    Misconfigured { name: String, reason: String },
}

impl Strategy {
    pub const DISCOVER_RSS: &'static str = "discover_rss_on_page";
    pub const SCRAPE_LIST: &'static str = "scrape_list";
    pub const EVENT_CALENDAR: &'static str = "follow_event_then_download_ics";
    pub const CALENDAR_SUBSCRIPTION: &'static str = "discover_ics_subscribe_link";

    pub fn as_str(&self) -> &str {
        match self {
            Strategy::DiscoverRss { .. } => Self::DISCOVER_RSS,
            Strategy::ScrapeList { .. } => Self::SCRAPE_LIST,
            Strategy::EventCalendar { .. } => Self::EVENT_CALENDAR,
            Strategy::CalendarSubscription { .. } => Self::CALENDAR_SUBSCRIPTION,
            Strategy::Unrecognized { name } | Strategy::Misconfigured { name, .. } => name,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub strategy: Strategy,
}

impl SourceConfig {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        strategy: Strategy,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            description: None,
            strategy,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}
