use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timed out: {0}")]
    Timeout(String),

    // Extraction errors
    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ScrapeError {
    /// Transport failures: DNS, connect, timeout, non-2xx.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ScrapeError::Http(_) | ScrapeError::HttpStatus { .. } | ScrapeError::Timeout(_)
        )
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = ScrapeError::HttpStatus {
            url: "https://example.gov/news".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "HTTP 503 from https://example.gov/news");
        assert!(err.is_transport());
    }

    #[test]
    fn test_config_error_is_not_transport() {
        let err = ScrapeError::Config("missing list_url".to_string());
        assert!(!err.is_transport());
    }
}
