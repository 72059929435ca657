use std::collections::HashSet;

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{error, info};

use crate::config::SourceCatalog;
use crate::domain::{RunReport, SourceConfig, SourceResult, Strategy};
use crate::errors::{ScrapeError, ScrapeResult};
use crate::fetch::PageFetcher;
use crate::services::DebugCapture;
use crate::strategies;

/// Runs configured sources and aggregates their outcomes.
pub struct ScrapeService<F: PageFetcher, C: DebugCapture> {
    fetcher: F,
    capture: C,
    pool: ThreadPool,
}

impl<F: PageFetcher, C: DebugCapture> ScrapeService<F, C> {
    pub fn new(fetcher: F, capture: C, workers: usize) -> ScrapeResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("scrape-worker-{}", i))
            .build()
            .map_err(|e| ScrapeError::Config(format!("cannot start worker pool: {}", e)))?;

        Ok(Self {
            fetcher,
            capture,
            pool,
        })
    }

    /// Scrape every catalog source, or only those named in `filter`.
    pub fn run_catalog(
        &self,
        catalog: &SourceCatalog,
        filter: Option<&HashSet<String>>,
    ) -> RunReport {
        info!(config = %catalog.name, version = %catalog.version, "Starting scrape run");
        let mut report = self.run(&catalog.sources, filter);
        report.config_version = catalog.version.clone();
        report
    }

    /// Results come back in configuration order whatever order the workers
    /// finish in. A failing source is recorded and never stops the others.
    pub fn run(&self, sources: &[SourceConfig], filter: Option<&HashSet<String>>) -> RunReport {
        let mut report = RunReport::new("unknown");

        let selected: Vec<&SourceConfig> = sources
            .iter()
            .filter(|s| filter.map_or(true, |ids| ids.contains(&s.id)))
            .collect();

        let results: Vec<SourceResult> = self
            .pool
            .install(|| selected.par_iter().map(|s| self.scrape_source(s)).collect());

        for result in results {
            report.record(result);
        }

        info!(
            total_items = report.total_items,
            sources = report.sources_scraped.len(),
            errors = report.errors.len(),
            "Scraping complete"
        );

        report
    }

    /// The per-source failure boundary.
    pub fn scrape_source(&self, source: &SourceConfig) -> SourceResult {
        info!(source = %source.id, strategy = %source.strategy, "Scraping source: {}", source.name);

        match strategies::execute(source, &self.fetcher, &self.capture) {
            Ok(items) => {
                info!(
                    source = %source.id,
                    items = items.len(),
                    "Successfully scraped {}",
                    source.name
                );

                let warning = match &source.strategy {
                    Strategy::Unrecognized { name } => {
                        Some(format!("unrecognized strategy '{}'", name))
                    }
                    _ => None,
                };
                SourceResult::success(source, items).with_warning(warning)
            }
            Err(e) => {
                let message = format!("Error scraping {}: {}", source.id, e);
                error!(source = %source.id, transport = e.is_transport(), "{}", message);
                SourceResult::failure(source, message)
            }
        }
    }
}
