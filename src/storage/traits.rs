use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Item, RunReport, SourceResult};
use crate::errors::ScrapeResult;

/// Destination for a finished run report.
#[cfg_attr(test, mockall::automock)]
pub trait ReportSink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Persist `report`, returning where it went.
    fn save(&self, report: &RunReport) -> ScrapeResult<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub id: i64,
    pub scrape_timestamp: DateTime<Utc>,
    pub config_version: String,
    pub total_items: usize,
    pub sources: usize,
    pub errors: usize,
}

pub trait RunHistory: Send + Sync {
    fn record_run(&self, report: &RunReport) -> ScrapeResult<i64>;
    fn recent_runs(&self, limit: usize) -> ScrapeResult<Vec<RunSummary>>;
    fn items_for_run(&self, run_id: i64) -> ScrapeResult<Vec<Item>>;

    /// Per-source outcomes of a run in configuration order, each with its
    /// items. Empty for an unknown run.
    fn results_for_run(&self, run_id: i64) -> ScrapeResult<Vec<SourceResult>>;
}
