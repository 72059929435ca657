use chrono::{DateTime, Utc};
use rusqlite::types::Type;

use crate::domain::{Item, RunReport, SourceResult, SourceStatus};
use crate::errors::ScrapeResult;
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::{ReportSink, RunHistory, RunSummary};

/// Keeps every run, its per-source outcomes and its items.
pub struct SqliteReportStore {
    storage: SqliteStorage,
}

impl SqliteReportStore {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl RunHistory for SqliteReportStore {
    fn record_run(&self, report: &RunReport) -> ScrapeResult<i64> {
        let mut conn = self.storage.connection()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO runs (scrape_timestamp, config_version, total_items, source_count, error_count) VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                report.scrape_timestamp.to_rfc3339(),
                &report.config_version,
                report.total_items as i64,
                report.sources_scraped.len() as i64,
                report.errors.len() as i64,
            ),
        )?;
        let run_id = tx.last_insert_rowid();

        let mut position: i64 = 0;
        for result in &report.sources_scraped {
            tx.execute(
                "INSERT INTO source_results (run_id, source_id, name, category, status, items_found, error, warning, scraped_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                (
                    run_id,
                    &result.id,
                    &result.name,
                    &result.category,
                    result.status.as_str(),
                    result.items_found as i64,
                    &result.error,
                    &result.warning,
                    result.scraped_at.to_rfc3339(),
                ),
            )?;

            for item in &result.items {
                tx.execute(
                    "INSERT INTO items (run_id, position, source_id, category, title, url, description, date, published, feed_url, ics_url, ics_data, scraped_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                    rusqlite::params![
                        run_id,
                        position,
                        &item.source_id,
                        &item.category,
                        &item.title,
                        &item.url,
                        &item.description,
                        &item.date,
                        &item.published,
                        &item.feed_url,
                        &item.ics_url,
                        &item.ics_data,
                        item.scraped_at.to_rfc3339(),
                    ],
                )?;
                position += 1;
            }
        }

        tx.commit()?;
        Ok(run_id)
    }

    fn recent_runs(&self, limit: usize) -> ScrapeResult<Vec<RunSummary>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, scrape_timestamp, config_version, total_items, source_count, error_count FROM runs ORDER BY id DESC LIMIT ?1",
        )?;

        let runs = stmt.query_map([limit as i64], |row| {
            let timestamp: String = row.get(1)?;
            let total_items: i64 = row.get(3)?;
            let sources: i64 = row.get(4)?;
            let errors: i64 = row.get(5)?;

            Ok(RunSummary {
                id: row.get(0)?,
                scrape_timestamp: parse_timestamp(1, &timestamp)?,
                config_version: row.get(2)?,
                total_items: total_items as usize,
                sources: sources as usize,
                errors: errors as usize,
            })
        })?;

        Ok(runs.collect::<Result<Vec<_>, _>>()?)
    }

    fn items_for_run(&self, run_id: i64) -> ScrapeResult<Vec<Item>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT source_id, category, title, url, description, date, published, feed_url, ics_url, ics_data, scraped_at FROM items WHERE run_id = ?1 ORDER BY position",
        )?;

        let items = stmt.query_map([run_id], |row| {
            let scraped_at: String = row.get(10)?;

            Ok(Item {
                source_id: row.get(0)?,
                category: row.get(1)?,
                title: row.get(2)?,
                url: row.get(3)?,
                description: row.get(4)?,
                date: row.get(5)?,
                published: row.get(6)?,
                feed_url: row.get(7)?,
                ics_url: row.get(8)?,
                ics_data: row.get(9)?,
                scraped_at: parse_timestamp(10, &scraped_at)?,
            })
        })?;

        Ok(items.collect::<Result<Vec<_>, _>>()?)
    }

    fn results_for_run(&self, run_id: i64) -> ScrapeResult<Vec<SourceResult>> {
        let mut results = {
            let conn = self.storage.connection()?;
            let mut stmt = conn.prepare(
                "SELECT source_id, name, category, status, items_found, error, warning, scraped_at \
                 FROM source_results WHERE run_id = ?1 ORDER BY id",
            )?;

            let rows = stmt.query_map([run_id], |row| {
                let status: String = row.get(3)?;
                let items_found: i64 = row.get(4)?;
                let scraped_at: String = row.get(7)?;

                Ok(SourceResult {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    category: row.get(2)?,
                    status: status.parse().unwrap_or(SourceStatus::Error),
                    items_found: items_found as usize,
                    items: Vec::new(),
                    error: row.get(5)?,
                    warning: row.get(6)?,
                    scraped_at: parse_timestamp(7, &scraped_at)?,
                })
            })?;

            rows.collect::<Result<Vec<_>, _>>()?
        };

        for item in self.items_for_run(run_id)? {
            if let Some(result) = results.iter_mut().find(|r| r.id == item.source_id) {
                result.items.push(item);
            }
        }

        Ok(results)
    }
}

impl ReportSink for SqliteReportStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn save(&self, report: &RunReport) -> ScrapeResult<String> {
        self.record_run(report).map(|id| format!("run #{}", id))
    }
}
