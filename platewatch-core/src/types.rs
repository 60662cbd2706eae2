use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single social-media post by a tracked restaurant account.
///
/// Immutable once produced by a post store. `follower_count` is the account's
/// follower count at the time the post was observed; analytics treat the first
/// observed value per account as authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub restaurant: String,
    pub follower_count: u64,
    pub posted_at: DateTime<Utc>,
    pub like_count: u64,
    pub comment_count: u64,
    pub tags: Vec<String>,
}

impl Post {
    /// Iterate the hashtag tokens of this post.
    ///
    /// Each tag field may itself be a comma-joined list (stores that keep tags
    /// as one delimited column produce those), so every element is split again
    /// and empty fragments are dropped.
    pub fn tag_tokens(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .flat_map(|raw| raw.split(','))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Split a raw delimited tag field into tokens.
///
/// Used at store boundaries that persist tags as a single comma-joined string.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Per-account engagement aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub restaurant: String,
    /// (total likes + total comments) / (posts x followers) x 100
    pub engagement_rate: f64,
    pub follower_count: u64,
    pub post_count: u64,
}

/// Percentage change in engagement rate between the recent and prior window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub restaurant: String,
    pub growth_rate: f64,
}

/// Detailed per-account summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantSummary {
    pub avg_likes: f64,
    pub avg_comments: f64,
    pub follower_count: u64,
    /// Top tags by frequency, at most five, ties in first-seen order.
    pub top_tags: Vec<(String, u64)>,
    pub post_count: u64,
}

/// Flattened export record joining summary, engagement and growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub restaurant: String,
    pub follower_count: u64,
    pub post_count: u64,
    pub avg_likes: f64,
    pub avg_comments: f64,
    pub engagement_rate: f64,
    pub growth_rate: f64,
    /// Comma-joined top tags, at most five.
    pub top_tags: String,
    pub exported_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(tags: &[&str]) -> Post {
        Post {
            restaurant: "@cafe".to_string(),
            follower_count: 1000,
            posted_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            like_count: 10,
            comment_count: 2,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn tag_tokens_splits_joined_fields() {
        let p = post(&["#foodie,#dinner", "#soulfood"]);
        let tokens: Vec<&str> = p.tag_tokens().collect();
        assert_eq!(tokens, vec!["#foodie", "#dinner", "#soulfood"]);
    }

    #[test]
    fn tag_tokens_drops_empty_fragments() {
        let p = post(&["", "#yummy,, ", "  "]);
        let tokens: Vec<&str> = p.tag_tokens().collect();
        assert_eq!(tokens, vec!["#yummy"]);
    }

    #[test]
    fn split_tags_trims_and_filters() {
        assert_eq!(
            split_tags(" #foodie, #lunch ,,"),
            vec!["#foodie".to_string(), "#lunch".to_string()]
        );
        assert!(split_tags("").is_empty());
    }
}
