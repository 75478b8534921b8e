//! Collect every item of a paginated listing by following continuation tokens.

use async_trait::async_trait;

use crate::error::StepResult;

/// One batch of results plus the token for the next batch, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// Fetches a single page given the continuation token of the previous one.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch_page(&self, token: Option<String>) -> StepResult<Page<T>>;
}

/// Fetch pages until no continuation token is returned, accumulating items in order.
///
/// There is no iteration cap: a service that keeps returning a token keeps this
/// loop running. Errors from `fetcher` are returned as-is.
pub async fn collect_all<T, F>(fetcher: &F) -> StepResult<Vec<T>>
where
    T: Send,
    F: PageFetcher<T> + ?Sized,
{
    let mut items = Vec::new();
    let mut token = None;
    let mut pages = 0usize;
    loop {
        let page = fetcher.fetch_page(token).await?;
        pages += 1;
        log::debug!("Fetched page {} with {} items", pages, page.items.len());
        items.extend(page.items);
        match page.next_token {
            Some(next) => token = Some(next),
            None => return Ok(items),
        }
    }
}
