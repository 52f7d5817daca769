//! News aggregation across independent feeds.

use crate::api::FeedSource;
use crate::normalize::news::parse_feed;
use futures::future::join_all;
use shared::NewsItem;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

/// Fetches every feed concurrently and merges the results newest-first
pub struct FeedAggregator {
    sources: Vec<Arc<dyn FeedSource>>,
    max_items: usize,
}

impl FeedAggregator {
    pub fn new(sources: Vec<Arc<dyn FeedSource>>, max_items: usize) -> Self {
        Self { sources, max_items }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Fetch and parse one feed; failures yield an empty list
    async fn collect_one(source: &dyn FeedSource) -> Vec<NewsItem> {
        let result = match source.fetch().await {
            Ok(document) => parse_feed(&document, source.label()),
            Err(e) => Err(e),
        };

        match result {
            Ok(items) => items,
            Err(e) => {
                warn!(source = %source.label(), error = %e, "Feed unavailable, skipping");
                Vec::new()
            }
        }
    }

    /// Merged items of all feeds, newest first, capped at `max_items`.
    ///
    /// Never fails: unreachable or unparseable feeds contribute nothing.
    pub async fn aggregate(&self) -> Vec<NewsItem> {
        let results = join_all(self.sources.iter().map(|s| Self::collect_one(s.as_ref()))).await;

        let fetched: usize = results.iter().map(Vec::len).sum();
        let mut items: Vec<NewsItem> = results.into_iter().flatten().collect();
        sort_newest_first(&mut items);
        items.truncate(self.max_items);

        info!(
            feeds = self.sources.len(),
            fetched = fetched,
            returned = items.len(),
            "News aggregated"
        );
        items
    }
}

/// Stable sort by publish time, descending; undated items go last
pub fn sort_newest_first(items: &mut [NewsItem]) {
    items.sort_by(|a, b| match (a.published, b.published) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
