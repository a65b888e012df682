//! Page walker for OpenAQ list endpoints.
//!
//! The API gives no reliable "last page" signal, so a walk ends once more
//! than `empty_page_threshold` consecutive pages come back empty, when the
//! page cap is reached, or on the first failed fetch.

use crate::error::{ApiError, CollectorError};
use futures::future::BoxFuture;
use std::time::Duration;
use tokio::time::sleep;

/// Type alias for the fetch function used in pagination.
pub type FetchFn<'a, T> = Box<dyn Fn(u32) -> BoxFuture<'a, Result<Vec<T>, ApiError>> + Send + Sync + 'a>;

/// Configuration for pagination behavior.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// Maximum number of pages to fetch
    pub max_pages: u32,
    /// Starting page number (usually 1)
    pub start_page: u32,
    /// Consecutive empty pages tolerated before stopping
    pub empty_page_threshold: u32,
    /// Pause between two page fetches
    pub page_pause: Duration,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_pages: 1000,
            start_page: 1,
            empty_page_threshold: 3,
            page_pause: Duration::from_secs(1),
        }
    }
}

/// Why a walk ended.
#[derive(Debug)]
pub enum StopReason {
    /// More than the tolerated number of consecutive empty pages
    EmptyPages,
    /// The page cap was reached
    PageCap,
    /// A page fetch failed; items gathered before it are kept
    Failed(ApiError),
}

/// Items gathered by a walk and how it ended.
#[derive(Debug)]
pub struct Pagination<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
    pub stop: StopReason,
}

/// Generic paginator for collecting items across multiple pages.
pub struct Paginator<'a, T> {
    config: PaginationConfig,
    fetch_fn: FetchFn<'a, T>,
}

impl<'a, T> Paginator<'a, T> {
    /// Collects items page by page until a stop condition is met.
    pub async fn collect_all(&self) -> Pagination<T> {
        let mut items = Vec::new();
        let mut pages_fetched = 0;
        let mut empty_pages = 0;
        let mut page = self.config.start_page;

        let stop = loop {
            if pages_fetched >= self.config.max_pages {
                break StopReason::PageCap;
            }
            if pages_fetched > 0 && !self.config.page_pause.is_zero() {
                sleep(self.config.page_pause).await;
            }

            let result = (self.fetch_fn)(page).await;
            pages_fetched += 1;

            match result {
                Ok(batch) if batch.is_empty() => {
                    empty_pages += 1;
                    tracing::debug!(page, empty_pages, "Empty page");
                    if empty_pages > self.config.empty_page_threshold {
                        break StopReason::EmptyPages;
                    }
                }
                Ok(batch) => {
                    tracing::debug!(page, count = batch.len(), "Fetched page");
                    empty_pages = 0;
                    items.extend(batch);
                }
                Err(err) => break StopReason::Failed(err),
            }

            page += 1;
        };

        Pagination {
            items,
            pages_fetched,
            stop,
        }
    }
}

/// Helper builder for creating paginators with fluent API.
pub struct PaginatorBuilder<'a, T> {
    config: PaginationConfig,
    fetch_fn: Option<FetchFn<'a, T>>,
}

impl<'a, T> PaginatorBuilder<'a, T> {
    /// Creates a new paginator builder.
    pub fn new() -> Self {
        Self {
            config: PaginationConfig::default(),
            fetch_fn: None,
        }
    }

    /// Sets the maximum number of pages to fetch.
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Sets the starting page number.
    pub fn start_page(mut self, start_page: u32) -> Self {
        self.config.start_page = start_page;
        self
    }

    /// Sets how many consecutive empty pages are tolerated.
    pub fn empty_page_threshold(mut self, threshold: u32) -> Self {
        self.config.empty_page_threshold = threshold;
        self
    }

    /// Sets the pause between page fetches.
    pub fn page_pause(mut self, pause: Duration) -> Self {
        self.config.page_pause = pause;
        self
    }

    /// Sets the fetch function returning the items of one page.
    pub fn fetch_with<F>(mut self, fetch_fn: F) -> Self
    where
        F: Fn(u32) -> BoxFuture<'a, Result<Vec<T>, ApiError>> + Send + Sync + 'a,
    {
        self.fetch_fn = Some(Box::new(fetch_fn));
        self
    }

    /// Builds the paginator.
    pub fn build(self) -> Result<Paginator<'a, T>, CollectorError> {
        let fetch_fn = self.fetch_fn.ok_or_else(|| {
            CollectorError::InvalidPagination("fetch function not set".to_string())
        })?;
        if self.config.start_page == 0 {
            return Err(CollectorError::InvalidPagination(
                "pages are numbered from 1".to_string(),
            ));
        }

        Ok(Paginator {
            config: self.config,
            fetch_fn,
        })
    }
}
