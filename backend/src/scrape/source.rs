//! Page sources: where results-table rows come from.
//!
//! A [`PageSource`] opens one [`PageSession`] per scrape. The session fetches
//! pages one at a time and must be closed by the caller when it is done,
//! whether or not every page succeeded.

use async_trait::async_trait;
use std::time::Duration;

use super::html::extract_table_rows;
use super::ScrapeError;
use crate::config::ScraperConfig;

/// Cell texts of every table row on one page.
pub type PageRows = Vec<Vec<String>>;

/// Factory for browsing sessions against the results site.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn PageSession>, ScrapeError>;
}

/// A live browsing session.
#[async_trait]
pub trait PageSession: Send {
    /// Fetch the rows of results page `page` (1-based).
    async fn fetch_rows(&mut self, page: u32) -> Result<PageRows, ScrapeError>;

    /// Release the session.
    async fn close(&mut self);
}

/// Fetches results pages over HTTP and parses them with `scraper`.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl HttpPageSource {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn page_url(base_url: &str, page: u32) -> String {
        let separator = if base_url.contains('?') { '&' } else { '?' };
        format!("{base_url}{separator}page={page}")
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn open_session(&self) -> Result<Box<dyn PageSession>, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout)
            .build()?;

        Ok(Box::new(HttpPageSession {
            client: Some(client),
            base_url: self.base_url.clone(),
        }))
    }
}

struct HttpPageSession {
    client: Option<reqwest::Client>,
    base_url: String,
}

#[async_trait]
impl PageSession for HttpPageSession {
    async fn fetch_rows(&mut self, page: u32) -> Result<PageRows, ScrapeError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ScrapeError::Session("session already closed".to_string()))?;

        let url = HttpPageSource::page_url(&self.base_url, page);
        log::info!("Navigating to: {}", url);

        let body = client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        log::debug!(
            "Page {} content (first 500 chars): {}",
            page,
            body.chars().take(500).collect::<String>()
        );

        extract_table_rows(&body)
    }

    async fn close(&mut self) {
        if self.client.take().is_some() {
            log::debug!("Closed scraping session for {}", self.base_url);
        }
    }
}
