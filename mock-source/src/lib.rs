//! A schema-conformant random post source.
//!
//! Stands in for a live ingestion pipeline: generates a plausible 30-day
//! snapshot of posts per tracked restaurant. The snapshot is fixed at
//! construction; callers wanting fresh data build a new source, matching the
//! snapshot model of the analytics layer.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use platewatch_core::{CoreError, Post, PostStore};

/// Hashtags the generator samples from.
const HASHTAG_POOL: [&str; 13] = [
    "#foodie",
    "#foodporn",
    "#instafood",
    "#yummy",
    "#delicious",
    "#dinner",
    "#lunch",
    "#breakfast",
    "#foodstagram",
    "#foodphotography",
    "#blackownedrestaurants",
    "#soulfood",
    "#caribbeanfood",
];

/// Bounds for the generated data.
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    pub days_back: i64,
    pub min_posts: u64,
    pub max_posts: u64,
    pub min_followers: u64,
    pub max_followers: u64,
    pub min_tags: usize,
    pub max_tags: usize,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            days_back: 30,
            min_posts: 10,
            max_posts: 30,
            min_followers: 1_000,
            max_followers: 50_000,
            min_tags: 3,
            max_tags: 7,
        }
    }
}

pub struct MockSource {
    snapshot: Vec<Post>,
}

impl MockSource {
    /// Generate a snapshot for the given restaurants with a random seed.
    pub fn new(restaurants: &[String], now: DateTime<Utc>) -> Self {
        Self::with_seed(restaurants, now, fastrand::u64(..))
    }

    /// Generate a deterministic snapshot from a fixed seed.
    pub fn with_seed(restaurants: &[String], now: DateTime<Utc>, seed: u64) -> Self {
        Self::with_config(restaurants, now, seed, MockSourceConfig::default())
    }

    pub fn with_config(
        restaurants: &[String],
        now: DateTime<Utc>,
        seed: u64,
        config: MockSourceConfig,
    ) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut snapshot = Vec::new();

        for restaurant in restaurants {
            let followers = rng.u64(config.min_followers..=config.max_followers);
            let post_count = rng.u64(config.min_posts..=config.max_posts);

            for _ in 0..post_count {
                let days_ago = rng.i64(0..config.days_back);
                let posted_at = now
                    - Duration::days(days_ago)
                    - Duration::hours(rng.i64(0..24))
                    - Duration::minutes(rng.i64(0..60));

                let likes = rng.u64(50..=(followers / 10).max(50));
                let comments = rng.u64(5..=(likes / 10).max(5));

                snapshot.push(Post {
                    restaurant: restaurant.clone(),
                    follower_count: followers,
                    posted_at,
                    like_count: likes,
                    comment_count: comments,
                    tags: sample_tags(&mut rng, config.min_tags, config.max_tags),
                });
            }
        }

        Self { snapshot }
    }

    pub fn snapshot(&self) -> &[Post] {
        &self.snapshot
    }
}

#[async_trait]
impl PostStore for MockSource {
    async fn posts(&self) -> Result<Vec<Post>, CoreError> {
        Ok(self.snapshot.clone())
    }
}

/// Sample between `min` and `max` distinct tags from the pool.
fn sample_tags(rng: &mut fastrand::Rng, min: usize, max: usize) -> Vec<String> {
    let count = rng.usize(min..=max.min(HASHTAG_POOL.len()));
    let mut pool: Vec<&str> = HASHTAG_POOL.to_vec();
    rng.shuffle(&mut pool);
    pool.truncate(count);
    pool.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restaurants(handles: &[&str]) -> Vec<String> {
        handles.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn generated_posts_respect_schema_bounds() {
        let now = Utc::now();
        let source = MockSource::with_seed(&restaurants(&["@a", "@b"]), now, 7);
        let config = MockSourceConfig::default();

        assert!(!source.snapshot().is_empty());
        for post in source.snapshot() {
            assert!(post.follower_count >= config.min_followers);
            assert!(post.follower_count <= config.max_followers);
            assert!(post.posted_at <= now);
            assert!(post.posted_at > now - Duration::days(config.days_back + 1));
            assert!(post.like_count >= 50);
            assert!(post.comment_count >= 5);
            assert!(post.tags.len() >= config.min_tags);
            assert!(post.tags.len() <= config.max_tags);
        }
    }

    #[test]
    fn post_count_per_restaurant_is_in_range() {
        let now = Utc::now();
        let source = MockSource::with_seed(&restaurants(&["@a"]), now, 7);
        let config = MockSourceConfig::default();

        let count = source.snapshot().len() as u64;
        assert!(count >= config.min_posts && count <= config.max_posts);
    }

    #[test]
    fn tags_are_distinct_within_a_post() {
        let now = Utc::now();
        let source = MockSource::with_seed(&restaurants(&["@a"]), now, 7);
        for post in source.snapshot() {
            let mut tags = post.tags.clone();
            tags.sort();
            tags.dedup();
            assert_eq!(tags.len(), post.tags.len());
        }
    }

    #[test]
    fn follower_count_is_constant_per_restaurant() {
        let now = Utc::now();
        let source = MockSource::with_seed(&restaurants(&["@a", "@b"]), now, 7);
        for handle in ["@a", "@b"] {
            let counts: Vec<u64> = source
                .snapshot()
                .iter()
                .filter(|p| p.restaurant == handle)
                .map(|p| p.follower_count)
                .collect();
            assert!(counts.windows(2).all(|w| w[0] == w[1]));
        }
    }

    #[test]
    fn same_seed_yields_identical_snapshot() {
        let now = Utc::now();
        let a = MockSource::with_seed(&restaurants(&["@a", "@b"]), now, 42);
        let b = MockSource::with_seed(&restaurants(&["@a", "@b"]), now, 42);
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn empty_restaurant_list_yields_empty_snapshot() {
        let source = MockSource::with_seed(&[], Utc::now(), 7);
        assert!(source.snapshot().is_empty());
    }

    #[tokio::test]
    async fn post_store_returns_the_snapshot() {
        let now = Utc::now();
        let source = MockSource::with_seed(&restaurants(&["@a"]), now, 7);
        let posts = source.posts().await.expect("mock store never fails");
        assert_eq!(posts, source.snapshot());
    }
}
