//! Page stitching.
//!
//! Satisfies a caller-requested item count from a provider whose pages are
//! capped at `max_page_size`, by requesting consecutive windows until the
//! count is met or the provider runs out. Pages are fetched sequentially
//! since each window starts where the previous one ended.

use crate::error::UpstreamError;
use async_trait::async_trait;
use tracing::debug;

/// Window of items requested from a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub size: usize,
}

/// One provider response
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Whether the provider has items beyond this page
    pub has_more: bool,
    /// Total number of items, when the provider reports it
    pub total: Option<u64>,
}

/// A provider that can serve an arbitrary `(offset, size)` window
#[async_trait]
pub trait PagedSource: Send + Sync {
    type Item: Send;

    async fn fetch(&self, request: PageRequest) -> Result<Page<Self::Item>, UpstreamError>;
}

/// Items accumulated across pages
#[derive(Debug, Clone)]
pub struct Stitched<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub total: Option<u64>,
    /// Number of upstream calls issued
    pub pages: usize,
}

/// Drives a [`PagedSource`] until a requested count is satisfied
#[derive(Debug, Clone, Copy)]
pub struct PageStitcher {
    max_page_size: usize,
}

impl PageStitcher {
    pub fn new(max_page_size: usize) -> Self {
        Self {
            max_page_size: max_page_size.max(1),
        }
    }

    /// Collect up to `limit` items starting at `offset`.
    ///
    /// Returns fewer than `limit` items when the provider is exhausted. A
    /// `limit` that fits in one page is served by exactly one call, short or
    /// not. Any failed page fails the whole collection; items from earlier
    /// pages are dropped rather than returned truncated.
    pub async fn collect<S>(
        &self,
        source: &S,
        offset: usize,
        limit: usize,
    ) -> Result<Stitched<S::Item>, UpstreamError>
    where
        S: PagedSource + ?Sized,
    {
        let mut items = Vec::with_capacity(limit);
        let mut next_offset = offset;
        let mut has_more = true;
        let mut total = None;
        let mut pages = 0;
        let single_call = limit <= self.max_page_size;

        while items.len() < limit && has_more {
            let request = PageRequest {
                offset: next_offset,
                size: (limit - items.len()).min(self.max_page_size),
            };

            debug!(
                offset = request.offset,
                size = request.size,
                page = pages + 1,
                "Fetching page"
            );

            let page = source.fetch(request).await?;
            pages += 1;

            let received = page.items.len().min(request.size);
            items.extend(page.items.into_iter().take(request.size));
            next_offset += received;
            has_more = page.has_more;
            total = page.total.or(total);

            if received == 0 || single_call {
                break;
            }
        }

        debug!(
            requested = limit,
            collected = items.len(),
            pages = pages,
            has_more = has_more,
            "Stitching complete"
        );

        Ok(Stitched {
            items,
            has_more,
            total,
            pages,
        })
    }
}
