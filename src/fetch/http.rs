use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::errors::{ScrapeError, ScrapeResult};
use crate::fetch::traits::{FetchedPage, PageFetcher};

/// Blocking HTTP fetcher carrying the scraper's identity header.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    deadline: Option<Instant>,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> ScrapeResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            timeout,
            deadline: None,
        })
    }

    /// Every request made after `deadline` fails with `Timeout`; requests made
    /// before it get at most the remaining time.
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    fn request_timeout(&self, url: &str) -> ScrapeResult<Duration> {
        let Some(deadline) = self.deadline else {
            return Ok(self.timeout);
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ScrapeError::Timeout(format!(
                "run deadline passed before fetching {}",
                url
            )));
        }
        Ok(remaining.min(self.timeout))
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> ScrapeError {
    if e.is_timeout() {
        ScrapeError::Timeout(url.to_string())
    } else {
        ScrapeError::Http(e)
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> ScrapeResult<FetchedPage> {
        let timeout = self.request_timeout(url)?;
        debug!(url, ?timeout, "GET");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().map_err(|e| transport_error(url, e))?;

        let mut page = FetchedPage::from_bytes(final_url, bytes.to_vec(), content_type);
        page.status = status.as_u16();
        Ok(page)
    }
}
