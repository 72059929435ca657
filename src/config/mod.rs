pub mod catalog;

pub use catalog::SourceCatalog;

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{ScrapeError, ScrapeResult};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; GovScrape-Bot/1.0)";
const DEFAULT_WORKERS: usize = 4;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub user_agent: String,
    pub workers: usize,
    pub timeout: Duration,
}

impl Settings {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> ScrapeResult<Self> {
        // .env next to the executable wins over the current directory
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ScrapeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = lookup("SCRAPER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config/sources.json"));

        let data_dir = lookup("SCRAPER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/universal"));

        let db_path = lookup("SCRAPER_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("history.db"));

        let user_agent = lookup("SCRAPER_USER_AGENT")
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let workers = match lookup("SCRAPER_WORKERS") {
            Some(raw) => parse_positive(&raw, "SCRAPER_WORKERS")? as usize,
            None => DEFAULT_WORKERS,
        };

        let timeout_secs = match lookup("SCRAPER_TIMEOUT_SECS") {
            Some(raw) => parse_positive(&raw, "SCRAPER_TIMEOUT_SECS")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            config_path,
            data_dir,
            db_path,
            user_agent,
            workers,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn debug_dir(&self) -> PathBuf {
        self.data_dir.join("debug")
    }
}

fn parse_positive(raw: &str, key: &str) -> ScrapeResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ScrapeError::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}
