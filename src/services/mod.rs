pub mod debug_capture;
pub mod scrape_service;

pub use debug_capture::{DebugCapture, DebugDirectory, NoCapture};
pub use scrape_service::ScrapeService;
