use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{EventSelectors, ListSelectors, SourceConfig, Strategy};
use crate::errors::{ScrapeError, ScrapeResult};

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    name: Option<String>,
    version: Option<serde_json::Value>,
    #[serde(default)]
    sources: Vec<SourceRecord>,
}

#[derive(Debug, Deserialize)]
struct SourceRecord {
    id: String,
    name: String,
    category: String,
    strategy: Option<String>,
    discovery_url: Option<String>,
    list_url: Option<String>,
    #[serde(default)]
    selectors: SelectorRecord,
    description: Option<String>,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
struct SelectorRecord {
    item: Option<String>,
    title: Option<String>,
    link: Option<String>,
    date: Option<String>,
    ics_link: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// The ordered set of sources one run works from.
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    pub name: String,
    pub version: String,
    pub sources: Vec<SourceConfig>,
}

impl SourceCatalog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> ScrapeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScrapeError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ScrapeResult<Self> {
        let document: CatalogDocument = serde_json::from_str(content)?;

        let version = match document.version {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        };

        let mut seen = HashSet::new();
        let mut sources = Vec::with_capacity(document.sources.len());

        for record in document.sources {
            if !seen.insert(record.id.clone()) {
                return Err(ScrapeError::Config(format!(
                    "duplicate source id '{}'",
                    record.id
                )));
            }

            if !record.enabled {
                debug!(source = %record.id, "Skipping disabled source");
                continue;
            }

            let source = record.into_source();
            match &source.strategy {
                Strategy::Unrecognized { name } => {
                    warn!(source = %source.id, strategy = %name, "Unknown strategy");
                }
                Strategy::Misconfigured { name, reason } => {
                    warn!(
                        source = %source.id,
                        strategy = %name,
                        "Misconfigured source: {}",
                        reason
                    );
                }
                _ => {}
            }
            sources.push(source);
        }

        Ok(Self {
            name: document.name.unwrap_or_else(|| "unknown".to_string()),
            version,
            sources,
        })
    }

    pub fn get(&self, id: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Ids in `ids` that name no configured source.
    pub fn unknown_ids<'a>(&self, ids: &'a HashSet<String>) -> Vec<&'a str> {
        let mut unknown: Vec<&str> = ids
            .iter()
            .filter(|id| self.get(id).is_none())
            .map(String::as_str)
            .collect();
        unknown.sort_unstable();
        unknown
    }
}

impl SourceRecord {
    fn into_source(self) -> SourceConfig {
        let strategy = build_strategy(
            self.strategy.as_deref().unwrap_or_default(),
            self.discovery_url,
            self.list_url,
            self.selectors,
        );

        SourceConfig::new(self.id, self.name, self.category, strategy)
            .with_description(self.description)
    }
}

fn build_strategy(
    name: &str,
    discovery_url: Option<String>,
    list_url: Option<String>,
    selectors: SelectorRecord,
) -> Strategy {
    let misconfigured = |reason: &str| Strategy::Misconfigured {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    match name {
        Strategy::DISCOVER_RSS => match non_blank(discovery_url) {
            Some(discovery_url) => Strategy::DiscoverRss { discovery_url },
            None => misconfigured("missing discovery_url"),
        },
        Strategy::CALENDAR_SUBSCRIPTION => match non_blank(discovery_url) {
            Some(discovery_url) => Strategy::CalendarSubscription { discovery_url },
            None => misconfigured("missing discovery_url"),
        },
        Strategy::SCRAPE_LIST => {
            let Some(list_url) = non_blank(list_url) else {
                return misconfigured("missing list_url");
            };
            let Some(item) = non_blank(selectors.item) else {
                return misconfigured("missing selectors.item");
            };
            Strategy::ScrapeList {
                list_url,
                selectors: ListSelectors {
                    item,
                    title: non_blank(selectors.title),
                    link: non_blank(selectors.link),
                    date: non_blank(selectors.date),
                },
            }
        }
        Strategy::EVENT_CALENDAR => {
            let Some(list_url) = non_blank(list_url) else {
                return misconfigured("missing list_url");
            };
            let Some(item) = non_blank(selectors.item) else {
                return misconfigured("missing selectors.item");
            };
            let Some(link) = non_blank(selectors.link) else {
                return misconfigured("missing selectors.link");
            };
            Strategy::EventCalendar {
                list_url,
                selectors: EventSelectors {
                    item,
                    link,
                    title: non_blank(selectors.title),
                    ics_link: non_blank(selectors.ics_link),
                },
            }
        }
        other => Strategy::Unrecognized {
            name: other.to_string(),
        },
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
