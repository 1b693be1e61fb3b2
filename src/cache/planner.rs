//! Invalidation plan generation.
//!
//! Maps an invalidation event to the ordered list of key patterns to purge.
//! Planning is pure so it can be checked without a store.

use std::fmt;

use super::events::{InvalidationEvent, ResourceType};
use super::keys::KeyPattern;

/// Patterns to delete for one event, in issue order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InvalidationPlan {
    pub patterns: Vec<KeyPattern>,
}

impl fmt::Display for InvalidationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InvalidationPlan [")?;
        for (index, pattern) in self.patterns.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{pattern}")?;
        }
        write!(f, "]")
    }
}

impl InvalidationPlan {
    /// Build the plan for a single event.
    ///
    /// - Post: list views always; the post's detail views when an id is known.
    /// - Comment: the post's comment views, or nothing without a post id.
    /// - Category: category views and post list views, which embed categories.
    pub fn for_event(event: &InvalidationEvent) -> Self {
        let patterns = match event.resource {
            ResourceType::Post => {
                let mut patterns = vec![KeyPattern::posts()];
                if let Some(post_id) = event.id() {
                    patterns.push(KeyPattern::post(post_id));
                }
                patterns
            }
            ResourceType::Comment => event
                .id()
                .map(KeyPattern::comments_for_post)
                .into_iter()
                .collect(),
            ResourceType::Category => vec![KeyPattern::categories(), KeyPattern::posts()],
        };

        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }
}
