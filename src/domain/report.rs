use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Item, SourceConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Success,
    Error,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::Success => "success",
            SourceStatus::Error => "error",
        }
    }
}

impl std::str::FromStr for SourceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "success" => Ok(SourceStatus::Success),
            "error" => Ok(SourceStatus::Error),
            _ => Err(format!("Unknown source status: {}", s)),
        }
    }
}

/// Outcome of one source in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    pub id: String,
    pub name: String,
    pub category: String,
    pub status: SourceStatus,
    pub items_found: usize,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

impl SourceResult {
    pub fn success(source: &SourceConfig, items: Vec<Item>) -> Self {
        Self {
            id: source.id.clone(),
            name: source.name.clone(),
            category: source.category.clone(),
            status: SourceStatus::Success,
            items_found: items.len(),
            items,
            error: None,
            warning: None,
            scraped_at: Utc::now(),
        }
    }

    pub fn failure(source: &SourceConfig, error: String) -> Self {
        Self {
            id: source.id.clone(),
            name: source.name.clone(),
            category: source.category.clone(),
            status: SourceStatus::Error,
            items_found: 0,
            items: Vec::new(),
            error: Some(error),
            warning: None,
            scraped_at: Utc::now(),
        }
    }

    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning = warning;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == SourceStatus::Success
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceError {
    pub source_id: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate of one invocation over the selected sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub scrape_timestamp: DateTime<Utc>,
    pub config_version: String,
    pub total_items: usize,
    pub sources_scraped: Vec<SourceResult>,
    pub errors: Vec<SourceError>,
}

impl RunReport {
    pub fn new(config_version: impl Into<String>) -> Self {
        Self {
            scrape_timestamp: Utc::now(),
            config_version: config_version.into(),
            total_items: 0,
            sources_scraped: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Appends a result, keeping `total_items` and `errors` in step with it.
    pub fn record(&mut self, result: SourceResult) {
        match result.status {
            SourceStatus::Success => self.total_items += result.items_found,
            SourceStatus::Error => self.errors.push(SourceError {
                source_id: result.id.clone(),
                error: result.error.clone().unwrap_or_default(),
                timestamp: result.scraped_at,
            }),
        }
        self.sources_scraped.push(result);
    }
}
