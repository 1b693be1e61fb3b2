//! Invalidation events.
//!
//! An event describes a completed write. It is built by the write path,
//! handed straight to the policy and never queued or persisted.

use std::fmt;

/// Resource family touched by a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Post,
    Comment,
    Category,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed mutation that may have made cached responses stale.
///
/// For comments, `resource_id` carries the id of the post the comment
/// belongs to, since comment views are scoped per post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationEvent {
    pub resource: ResourceType,
    pub resource_id: Option<String>,
}

impl InvalidationEvent {
    pub fn post(post_id: Option<&str>) -> Self {
        Self {
            resource: ResourceType::Post,
            resource_id: post_id.map(str::to_string),
        }
    }

    pub fn comments(post_id: Option<&str>) -> Self {
        Self {
            resource: ResourceType::Comment,
            resource_id: post_id.map(str::to_string),
        }
    }

    pub fn category() -> Self {
        Self {
            resource: ResourceType::Category,
            resource_id: None,
        }
    }

    /// The id with empty strings treated as absent.
    pub fn id(&self) -> Option<&str> {
        self.resource_id.as_deref().filter(|id| !id.is_empty())
    }
}
