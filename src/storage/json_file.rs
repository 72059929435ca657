use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::RunReport;
use crate::errors::ScrapeResult;
use crate::storage::traits::ReportSink;

/// Writes each report as `scrape_results_<YYYYmmdd_HHMMSS>.json`.
pub struct JsonReportWriter {
    dir: PathBuf,
}

impl JsonReportWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn file_path(&self, report: &RunReport) -> PathBuf {
        self.dir.join(format!(
            "scrape_results_{}.json",
            report.scrape_timestamp.format("%Y%m%d_%H%M%S")
        ))
    }

    pub fn write(&self, report: &RunReport) -> ScrapeResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.file_path(report);
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json)?;

        Ok(path)
    }
}

impl ReportSink for JsonReportWriter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn save(&self, report: &RunReport) -> ScrapeResult<String> {
        self.write(report).map(|p| p.display().to_string())
    }
}
