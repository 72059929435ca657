mod connection;
mod report_store;

pub use connection::SqliteStorage;
pub use report_store::SqliteReportStore;
