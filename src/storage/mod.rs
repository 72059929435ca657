pub mod json_file;
pub mod sqlite;
pub mod traits;

use tracing::{error, info};

use crate::domain::RunReport;

pub use json_file::JsonReportWriter;
pub use sqlite::{SqliteReportStore, SqliteStorage};
pub use traits::{ReportSink, RunHistory, RunSummary};

/// Hands the report to every sink. A failing sink is logged and skipped;
/// returns how many sinks succeeded.
pub fn save_all(sinks: &[&dyn ReportSink], report: &RunReport) -> usize {
    let mut saved = 0;

    for sink in sinks {
        match sink.save(report) {
            Ok(location) => {
                info!(sink = sink.name(), location = %location, "Saved run report");
                saved += 1;
            }
            Err(e) => error!(sink = sink.name(), "Failed to save run report: {}", e),
        }
    }

    saved
}
