use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{OffsetPage, PageRequest};
use crate::application::repos::{
    CreatePostParams, PostQueryFilter, PostsRepo, Reaction, RepoError, UpdatePostParams,
};
use crate::domain::entities::PostRecord;

use super::{MemoryRepositories, POST_SLUG_CONSTRAINT};

#[async_trait]
impl PostsRepo for MemoryRepositories {
    async fn list_posts(
        &self,
        filter: &PostQueryFilter,
        page: PageRequest,
    ) -> Result<OffsetPage<PostRecord>, RepoError> {
        let mut matching: Vec<PostRecord> = self
            .posts
            .iter()
            .filter(|entry| {
                filter
                    .category_id
                    .is_none_or(|category_id| entry.category_id == Some(category_id))
            })
            .map(|entry| entry.value().clone())
            .collect();

        // Newest first; id breaks ties so paging is stable.
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset())
            .take(page.limit as usize)
            .collect();

        Ok(OffsetPage::new(items, page, total))
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.posts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        Ok(self.post_slugs.contains_key(slug))
    }

    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let id = Uuid::new_v4();
        match self.post_slugs.entry(params.slug.clone()) {
            Entry::Occupied(_) => return Err(RepoError::duplicate(POST_SLUG_CONSTRAINT)),
            Entry::Vacant(vacant) => {
                vacant.insert(id);
            }
        }

        let now = OffsetDateTime::now_utc();
        let record = PostRecord {
            id,
            slug: params.slug,
            title: params.title,
            excerpt: params.excerpt,
            body: params.body,
            category_id: params.category_id,
            likes: 0,
            dislikes: 0,
            created_at: now,
            updated_at: now,
        };
        self.posts.insert(id, record.clone());
        Ok(record)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut post = self.posts.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        post.title = params.title;
        post.excerpt = params.excerpt;
        post.body = params.body;
        post.category_id = params.category_id;
        post.updated_at = OffsetDateTime::now_utc();
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let (_, post) = self.posts.remove(&id).ok_or(RepoError::NotFound)?;
        self.post_slugs.remove(&post.slug);
        Ok(())
    }

    async fn react(&self, id: Uuid, reaction: Reaction) -> Result<PostRecord, RepoError> {
        let mut post = self.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        match reaction {
            Reaction::Like => post.likes = post.likes.saturating_add(1),
            Reaction::Dislike => post.dislikes = post.dislikes.saturating_add(1),
        }
        Ok(post.clone())
    }

    async fn clear_category(&self, category_id: Uuid) -> Result<u64, RepoError> {
        let now = OffsetDateTime::now_utc();
        let mut cleared = 0;
        for mut post in self.posts.iter_mut() {
            if post.category_id == Some(category_id) {
                post.category_id = None;
                post.updated_at = now;
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}
