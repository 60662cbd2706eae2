//! Top-N views over the aggregation engine.
//!
//! [`Analytics`] is the context object callers inject their collaborators
//! into: a [`PostStore`] and a [`Registry`]. Every method takes a fresh
//! snapshot of both before delegating to the pure engine functions, so
//! results always reflect the registry at call time.

use crate::engine::{self, DEFAULT_TREND_WINDOW_DAYS};
use chrono::{Duration, Utc};
use platewatch_core::{
    normalize_handle, CoreError, EngagementRecord, ExportRow, Post, PostStore, Registry,
    RestaurantSummary, TrendRecord,
};

pub struct Analytics<S, R> {
    store: S,
    registry: R,
    trend_window: Duration,
}

impl<S: PostStore, R: Registry> Analytics<S, R> {
    pub fn new(store: S, registry: R) -> Self {
        Self {
            store,
            registry,
            trend_window: Duration::days(DEFAULT_TREND_WINDOW_DAYS),
        }
    }

    /// Override the trend window length (days).
    pub fn with_trend_window(mut self, days: i64) -> Self {
        self.trend_window = Duration::days(days);
        self
    }

    /// Top `n` tracked accounts by engagement rate, descending.
    pub async fn top_restaurants(&self, n: usize) -> Result<Vec<EngagementRecord>, CoreError> {
        let (posts, tracked) = self.snapshot().await?;
        let mut records = engine::engagement_rates(&posts, &tracked);
        records.sort_by(|a, b| b.engagement_rate.total_cmp(&a.engagement_rate));
        records.truncate(n);
        Ok(records)
    }

    /// Top `n` hashtags by frequency across tracked accounts.
    pub async fn top_hashtags(&self, n: usize) -> Result<Vec<(String, u64)>, CoreError> {
        let (posts, tracked) = self.snapshot().await?;
        let mut freq = engine::hashtag_frequency(&posts, &tracked);
        freq.truncate(n);
        Ok(freq)
    }

    /// Top `n` tracked accounts by growth rate, descending.
    pub async fn trending_restaurants(&self, n: usize) -> Result<Vec<TrendRecord>, CoreError> {
        let (posts, tracked) = self.snapshot().await?;
        let mut trends = engine::growth_trends(&posts, &tracked, Utc::now(), self.trend_window);
        trends.sort_by(|a, b| b.growth_rate.total_cmp(&a.growth_rate));
        trends.truncate(n);
        Ok(trends)
    }

    /// Detailed summary for one account. The handle is normalized first, so
    /// bare and `@`-prefixed spellings resolve to the same account. `Ok(None)`
    /// means not tracked or no posts; upstream failures stay errors.
    pub async fn summary(&self, handle: &str) -> Result<Option<RestaurantSummary>, CoreError> {
        let normalized = normalize_handle(handle);
        let (posts, tracked) = self.snapshot().await?;
        Ok(engine::restaurant_summary(&posts, &tracked, &normalized))
    }

    /// Flattened export rows for every tracked account with posts.
    pub async fn export(&self) -> Result<Vec<ExportRow>, CoreError> {
        let (posts, tracked) = self.snapshot().await?;
        Ok(engine::export_rows(
            &posts,
            &tracked,
            Utc::now(),
            self.trend_window,
        ))
    }

    async fn snapshot(&self) -> Result<(Vec<Post>, Vec<String>), CoreError> {
        let tracked = self.registry.list().await?;
        let posts = self.store.posts().await?;
        Ok((posts, tracked))
    }
}
