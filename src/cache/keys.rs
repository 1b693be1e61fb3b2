//! Cache key definitions.
//!
//! Defines `CacheKey` for stored responses and `KeyPattern` for bulk deletion.
//! Keys follow the read-through convention `cache:<request path>[?query]`, so
//! invalidation patterns must be built from the same constants.

use std::fmt;

/// Prefix shared by every response cache key.
pub const KEY_PREFIX: &str = "cache:";

/// Trailing wildcard marking a prefix pattern.
pub const WILDCARD: char = '*';

const POSTS_PATH: &str = "/api/posts";
const COMMENTS_BY_POST_PATH: &str = "/api/comments/post";
const CATEGORIES_PATH: &str = "/api/categories";

/// A fully-resolved cache key such as `cache:/api/posts/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from a request path and optional query string.
    ///
    /// An empty query is treated as absent so `/api/posts` and `/api/posts?`
    /// share one entry.
    pub fn from_request(path: &str, query: Option<&str>) -> Self {
        match query.filter(|q| !q.is_empty()) {
            Some(query) => Self(format!("{KEY_PREFIX}{path}?{query}")),
            None => Self(format!("{KEY_PREFIX}{path}")),
        }
    }

    /// Wrap an already-prefixed key.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A deletion pattern: either an exact key or a literal prefix ending in `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPattern(String);

impl KeyPattern {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Pattern matching every list and pagination view of posts.
    pub fn posts() -> Self {
        Self(format!("{KEY_PREFIX}{POSTS_PATH}{WILDCARD}"))
    }

    /// Pattern matching the detail views of a single post.
    pub fn post(post_id: &str) -> Self {
        Self(format!("{KEY_PREFIX}{POSTS_PATH}/{post_id}{WILDCARD}"))
    }

    /// Pattern matching the comment views scoped to a single post.
    pub fn comments_for_post(post_id: &str) -> Self {
        Self(format!(
            "{KEY_PREFIX}{COMMENTS_BY_POST_PATH}/{post_id}{WILDCARD}"
        ))
    }

    /// Pattern matching every category view.
    pub fn categories() -> Self {
        Self(format!("{KEY_PREFIX}{CATEGORIES_PATH}{WILDCARD}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the literal prefix when this is a wildcard pattern.
    pub fn prefix(&self) -> Option<&str> {
        self.0.strip_suffix(WILDCARD)
    }

    /// Whether `key` is selected by this pattern.
    pub fn matches(&self, key: &str) -> bool {
        match self.prefix() {
            Some(prefix) => key.starts_with(prefix),
            None => key == self.0,
        }
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
