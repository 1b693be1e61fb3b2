//! In-process repository implementations.
//!
//! Each table is a `DashMap` keyed by id; unique slugs are claimed through a
//! side index so concurrent inserts cannot both win.

mod categories;
mod comments;
mod posts;

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::entities::{CategoryRecord, CommentRecord, PostRecord};

const POST_SLUG_CONSTRAINT: &str = "posts.slug";
const CATEGORY_SLUG_CONSTRAINT: &str = "categories.slug";

#[derive(Clone, Default)]
pub struct MemoryRepositories {
    posts: Arc<DashMap<Uuid, PostRecord>>,
    post_slugs: Arc<DashMap<String, Uuid>>,
    comments: Arc<DashMap<Uuid, CommentRecord>>,
    categories: Arc<DashMap<Uuid, CategoryRecord>>,
    category_slugs: Arc<DashMap<String, Uuid>>,
}

impl MemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }
}
