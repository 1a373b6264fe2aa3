//! Result scraping.
//!
//! [`ResultScraper`] walks a fixed number of paginated results pages through a
//! [`PageSource`] and turns every row with at least four cells into a
//! [`RawDrawResult`]. Failures never leave this module: a failed page ends the
//! walk and whatever was collected so far is returned.

pub mod html;
pub mod source;

use std::sync::Arc;

use crate::models::RawDrawResult;

pub use source::{HttpPageSource, PageRows, PageSession, PageSource};

/// Default number of results pages walked per scrape.
pub const DEFAULT_PAGE_COUNT: u32 = 10;

/// Errors raised while fetching or parsing a page.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Session error: {0}")]
    Session(String),
}

/// Scrapes draw results across the paginated results table.
#[derive(Clone)]
pub struct ResultScraper {
    source: Arc<dyn PageSource>,
    pages: u32,
}

impl ResultScraper {
    pub fn new(source: Arc<dyn PageSource>, pages: u32) -> Self {
        Self { source, pages }
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Scrape pages `1..=pages` in order.
    ///
    /// One session is opened per call and always closed before returning.
    /// Never fails: page errors are logged and cut the walk short.
    pub async fn scrape(&self) -> Vec<RawDrawResult> {
        let mut session = match self.source.open_session().await {
            Ok(session) => session,
            Err(e) => {
                log::error!("Error opening scraping session: {}", e);
                return Vec::new();
            }
        };

        let mut results = Vec::new();
        for page in 1..=self.pages {
            match session.fetch_rows(page).await {
                Ok(rows) => {
                    let found = rows.len();
                    let before = results.len();
                    results.extend(rows.into_iter().filter_map(row_to_result));
                    log::info!(
                        "Page {}: {} table rows, {} results",
                        page,
                        found,
                        results.len() - before
                    );
                }
                Err(e) => {
                    log::error!("Error during scraping page {}: {}", page, e);
                    break;
                }
            }
        }

        session.close().await;
        results
    }
}

fn row_to_result(cells: Vec<String>) -> Option<RawDrawResult> {
    if cells.len() < 4 {
        return None;
    }
    let mut cells = cells.into_iter();
    Some(RawDrawResult {
        draw_id: cells.next()?,
        draw: cells.next()?,
        date: cells.next()?,
        numbers: cells.next()?,
    })
}
