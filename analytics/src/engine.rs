//! The aggregation engine.
//!
//! Every function here is a pure function of `(posts, tracked set, optional
//! current time)`: no connections, no caches, no interior state. Callers pass
//! in an immutable snapshot of the post collection and the materialized
//! tracked-handle list; posts for untracked accounts are ignored even when
//! present in the snapshot.

use chrono::{DateTime, Duration, Utc};
use platewatch_core::{EngagementRecord, ExportRow, Post, RestaurantSummary, TrendRecord};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Length of the "recent" window for growth trends when none is configured.
pub const DEFAULT_TREND_WINDOW_DAYS: i64 = 14;

/// How many tags a summary reports.
pub const TOP_TAGS_PER_SUMMARY: usize = 5;

/// Engagement rate per tracked account.
///
/// For each tracked handle with at least one post:
/// `(total likes + total comments) / (post count x followers) x 100`, with the
/// follower count taken from the account's first post in the snapshot.
/// Accounts with zero posts are skipped; accounts reporting zero followers are
/// a data-quality condition, logged and skipped rather than raised.
///
/// Result order follows the tracked-handle iteration order. Ranking consumers
/// sort explicitly.
pub fn engagement_rates(posts: &[Post], tracked: &[String]) -> Vec<EngagementRecord> {
    tracked
        .iter()
        .filter_map(|handle| {
            let own: Vec<&Post> = posts.iter().filter(|p| &p.restaurant == handle).collect();
            let first = own.first()?;
            let followers = first.follower_count;
            if followers == 0 {
                warn!(restaurant = %handle, "account reports zero followers, skipping engagement rate");
                return None;
            }
            let likes: u64 = own.iter().map(|p| p.like_count).sum();
            let comments: u64 = own.iter().map(|p| p.comment_count).sum();
            let rate = (likes + comments) as f64 / (own.len() as u64 * followers) as f64 * 100.0;
            Some(EngagementRecord {
                restaurant: handle.clone(),
                engagement_rate: rate,
                follower_count: followers,
                post_count: own.len() as u64,
            })
        })
        .collect()
}

/// Hashtag usage across all posts of tracked accounts.
///
/// Tags are tokenized by splitting on `,`; empty fragments count as nothing,
/// so a post with no tags contributes zero tokens. The result is ordered by
/// descending count with ties kept in first-seen order. Never fails: an empty
/// snapshot or a snapshot without tags yields an empty mapping.
pub fn hashtag_frequency(posts: &[Post], tracked: &[String]) -> Vec<(String, u64)> {
    let tracked_set: HashSet<&str> = tracked.iter().map(String::as_str).collect();
    count_tags(
        posts
            .iter()
            .filter(|p| tracked_set.contains(p.restaurant.as_str())),
    )
}

/// Growth in engagement rate between the recent window and everything before it.
///
/// Posts of each tracked account are partitioned at `now - window`: those at or
/// after the cutoff are "recent", older ones are "prior". An account missing
/// either window is excluded. A window's rate is
/// `(mean likes + mean comments) / followers x 100`, with the follower count of
/// the first record in that window (follower counts are assumed constant per
/// account within the observation period). Growth is the percentage change from
/// prior to recent; a zero prior rate yields a defined growth of 0 so that
/// downstream ranking stays total.
pub fn growth_trends(
    posts: &[Post],
    tracked: &[String],
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<TrendRecord> {
    let cutoff = now - window;
    tracked
        .iter()
        .filter_map(|handle| {
            let (recent, prior): (Vec<&Post>, Vec<&Post>) = posts
                .iter()
                .filter(|p| &p.restaurant == handle)
                .partition(|p| p.posted_at >= cutoff);
            if recent.is_empty() || prior.is_empty() {
                return None;
            }
            let recent_rate = window_rate(handle, &recent)?;
            let prior_rate = window_rate(handle, &prior)?;
            let growth = if prior_rate > 0.0 {
                (recent_rate - prior_rate) / prior_rate * 100.0
            } else {
                0.0
            };
            Some(TrendRecord {
                restaurant: handle.clone(),
                growth_rate: growth,
            })
        })
        .collect()
}

/// Detailed summary for one tracked account.
///
/// Returns `None` when the handle is not tracked or has no posts in the
/// snapshot; the two cases are indistinguishable on purpose (an untracked
/// account's posts are invisible to the engine).
pub fn restaurant_summary(
    posts: &[Post],
    tracked: &[String],
    handle: &str,
) -> Option<RestaurantSummary> {
    if !tracked.iter().any(|t| t == handle) {
        return None;
    }
    let own: Vec<&Post> = posts.iter().filter(|p| p.restaurant == handle).collect();
    let first = own.first()?;
    let likes: u64 = own.iter().map(|p| p.like_count).sum();
    let comments: u64 = own.iter().map(|p| p.comment_count).sum();
    let mut top_tags = count_tags(own.iter().copied());
    top_tags.truncate(TOP_TAGS_PER_SUMMARY);
    Some(RestaurantSummary {
        avg_likes: likes as f64 / own.len() as f64,
        avg_comments: comments as f64 / own.len() as f64,
        follower_count: first.follower_count,
        top_tags,
        post_count: own.len() as u64,
    })
}

/// Flattened export rows for all tracked accounts.
///
/// Joins summary, engagement rate and growth rate per handle; accounts without
/// a summary (no posts) are skipped silently, and a missing engagement or
/// growth value defaults to 0. Percentage and average fields are rounded to
/// two decimals; `now` is stamped on every row as the snapshot timestamp.
pub fn export_rows(
    posts: &[Post],
    tracked: &[String],
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<ExportRow> {
    let engagement: HashMap<String, f64> = engagement_rates(posts, tracked)
        .into_iter()
        .map(|r| (r.restaurant, r.engagement_rate))
        .collect();
    let growth: HashMap<String, f64> = growth_trends(posts, tracked, now, window)
        .into_iter()
        .map(|t| (t.restaurant, t.growth_rate))
        .collect();

    tracked
        .iter()
        .filter_map(|handle| {
            let summary = restaurant_summary(posts, tracked, handle)?;
            let tags: Vec<&str> = summary.top_tags.iter().map(|(t, _)| t.as_str()).collect();
            Some(ExportRow {
                restaurant: handle.clone(),
                follower_count: summary.follower_count,
                post_count: summary.post_count,
                avg_likes: round2(summary.avg_likes),
                avg_comments: round2(summary.avg_comments),
                engagement_rate: round2(engagement.get(handle).copied().unwrap_or(0.0)),
                growth_rate: round2(growth.get(handle).copied().unwrap_or(0.0)),
                top_tags: tags.join(","),
                exported_at: now,
            })
        })
        .collect()
}

/// Engagement rate of one window of posts, or `None` for a zero-follower
/// window (logged, same treatment as in [`engagement_rates`]).
fn window_rate(handle: &str, window_posts: &[&Post]) -> Option<f64> {
    let followers = window_posts.first()?.follower_count;
    if followers == 0 {
        warn!(restaurant = %handle, "window reports zero followers, excluding from trends");
        return None;
    }
    let count = window_posts.len() as f64;
    let mean_likes = window_posts.iter().map(|p| p.like_count).sum::<u64>() as f64 / count;
    let mean_comments = window_posts.iter().map(|p| p.comment_count).sum::<u64>() as f64 / count;
    Some((mean_likes + mean_comments) / followers as f64 * 100.0)
}

/// Count tag tokens across posts, descending by count, ties in first-seen
/// order (stable sort over insertion order).
fn count_tags<'a>(posts: impl Iterator<Item = &'a Post>) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for post in posts {
        for token in post.tag_tokens() {
            match index.get(token) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(token.to_string(), counts.len());
                    counts.push((token.to_string(), 1));
                }
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
