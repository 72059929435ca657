use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One normalized piece of discovered content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub source_id: String,
    pub category: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ics_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ics_data: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

impl Item {
    /// Returns `None` when the title is blank; title is the only field every
    /// strategy must produce.
    pub fn new(source_id: &str, category: &str, title: &str) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        Some(Self {
            source_id: source_id.to_string(),
            category: category.to_string(),
            title: title.to_string(),
            url: None,
            description: None,
            date: None,
            published: None,
            feed_url: None,
            ics_url: None,
            ics_data: None,
            scraped_at: Utc::now(),
        })
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date = date;
        self
    }

    pub fn with_published(mut self, published: Option<String>) -> Self {
        self.published = published;
        self
    }

    pub fn with_feed_url(mut self, feed_url: Option<String>) -> Self {
        self.feed_url = feed_url;
        self
    }

    pub fn with_calendar(mut self, ics_url: String, ics_data: String) -> Self {
        self.ics_url = Some(ics_url);
        self.ics_data = Some(ics_data);
        self
    }
}
