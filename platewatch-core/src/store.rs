use crate::error::CoreError;
use crate::types::Post;
use async_trait::async_trait;

/// Sentinel prefix that marks a normalized handle.
pub const HANDLE_PREFIX: char = '@';

/// Normalize a bare handle by prefixing `@` when absent.
///
/// Surrounding whitespace is dropped; an already-prefixed handle passes
/// through unchanged. Normalization is the registry's concern: every handle
/// that reaches the analytics layer has already been through this.
pub fn normalize_handle(handle: &str) -> String {
    let trimmed = handle.trim();
    if trimmed.starts_with(HANDLE_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{HANDLE_PREFIX}{trimmed}")
    }
}

/// Read interface of a post store collaborator.
///
/// Returns the full current collection; the aggregation engine filters by
/// tracked set itself, so no filtering parameter exists here.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn posts(&self) -> Result<Vec<Post>, CoreError>;
}

/// The tracked-handle registry: a small durable set of normalized handles.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Track a handle. Normalizes first, returns the stored form.
    async fn add(&self, handle: &str) -> Result<String, CoreError>;

    /// Stop tracking a handle. Returns whether it was tracked.
    async fn remove(&self, handle: &str) -> Result<bool, CoreError>;

    /// All tracked handles, sorted for display.
    async fn list(&self) -> Result<Vec<String>, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_handle_gets_prefixed() {
        assert_eq!(normalize_handle("soulspoon"), "@soulspoon");
    }

    #[test]
    fn prefixed_handle_is_unchanged() {
        assert_eq!(normalize_handle("@soulspoon"), "@soulspoon");
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(normalize_handle("  soulspoon "), "@soulspoon");
        assert_eq!(normalize_handle(" @soulspoon"), "@soulspoon");
    }
}
