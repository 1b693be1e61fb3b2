//! Post service: validation, persistence and cache invalidation for posts.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::pagination::{OffsetPage, PageRequest};
use crate::application::repos::{
    CategoriesRepo, CommentsRepo, CreatePostParams, PostQueryFilter, PostsRepo, Reaction,
    RepoError, UpdatePostParams,
};
use crate::cache::CacheTrigger;
use crate::domain::entities::PostRecord;
use crate::domain::error::{DomainError, require_text};
use crate::domain::slug::{MAX_SUFFIX_ATTEMPTS, SlugAsyncError, generate_unique_slug_async};

const EXCERPT_CHARS: usize = 160;

#[derive(Debug, Error)]
pub enum PostServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<SlugAsyncError<RepoError>> for PostServiceError {
    fn from(err: SlugAsyncError<RepoError>) -> Self {
        match err {
            SlugAsyncError::Slug(err) => Self::Domain(DomainError::validation(err.to_string())),
            SlugAsyncError::Predicate(err) => Self::Repo(err),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostCommand {
    pub title: String,
    pub body: String,
    pub excerpt: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostCommand {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub excerpt: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostsRepo>,
    comments: Arc<dyn CommentsRepo>,
    categories: Arc<dyn CategoriesRepo>,
    cache_trigger: Option<Arc<CacheTrigger>>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        comments: Arc<dyn CommentsRepo>,
        categories: Arc<dyn CategoriesRepo>,
    ) -> Self {
        Self {
            posts,
            comments,
            categories,
            cache_trigger: None,
        }
    }

    /// Set the cache trigger for this service (optional).
    pub fn with_cache_trigger_opt(mut self, trigger: Option<Arc<CacheTrigger>>) -> Self {
        self.cache_trigger = trigger;
        self
    }

    pub async fn list(
        &self,
        filter: &PostQueryFilter,
        page: PageRequest,
    ) -> Result<OffsetPage<PostRecord>, PostServiceError> {
        self.posts
            .list_posts(filter, page)
            .await
            .map_err(PostServiceError::from)
    }

    pub async fn get(&self, id: Uuid) -> Result<PostRecord, PostServiceError> {
        self.posts
            .find_post(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post").into())
    }

    pub async fn create(&self, command: CreatePostCommand) -> Result<PostRecord, PostServiceError> {
        let title = require_text("title", &command.title)?;
        let body = require_text("body", &command.body)?;
        let excerpt = resolve_excerpt(command.excerpt.as_deref(), &body);
        self.ensure_category(command.category_id).await?;

        // A concurrent create can claim the chosen slug between the lookup
        // and the insert; pick the next free one and try again.
        let mut retries = 0;
        let post = loop {
            let slug = self.free_slug(&title).await?;
            let params = CreatePostParams {
                slug,
                title: title.clone(),
                excerpt: excerpt.clone(),
                body: body.clone(),
                category_id: command.category_id,
            };
            match self.posts.create_post(params).await {
                Ok(post) => break post,
                Err(RepoError::Duplicate { .. }) if retries < MAX_SUFFIX_ATTEMPTS => {
                    retries += 1;
                    debug!(retries, title = %title, "post slug taken concurrently, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        };
        info!(post_id = %post.id, slug = %post.slug, "post created");

        self.post_changed(post.id).await;
        Ok(post)
    }

    pub async fn update(&self, command: UpdatePostCommand) -> Result<PostRecord, PostServiceError> {
        let title = require_text("title", &command.title)?;
        let body = require_text("body", &command.body)?;
        let excerpt = resolve_excerpt(command.excerpt.as_deref(), &body);
        self.ensure_category(command.category_id).await?;

        let post = self
            .posts
            .update_post(UpdatePostParams {
                id: command.id,
                title,
                excerpt,
                body,
                category_id: command.category_id,
            })
            .await
            .map_err(|err| not_found_as::<PostServiceError>("post", err))?;

        self.post_changed(post.id).await;
        Ok(post)
    }

    /// Delete a post together with its comments.
    pub async fn delete(&self, id: Uuid) -> Result<(), PostServiceError> {
        self.posts
            .delete_post(id)
            .await
            .map_err(|err| not_found_as::<PostServiceError>("post", err))?;
        let removed_comments = self.comments.delete_for_post(id).await;

        // The post row is gone whether or not its comments followed.
        if let Some(trigger) = &self.cache_trigger {
            let post_id = id.to_string();
            trigger.post_changed(Some(&post_id)).await;
            trigger.comments_changed(Some(&post_id)).await;
        }

        let removed_comments = removed_comments?;
        info!(post_id = %id, removed_comments, "post deleted");
        Ok(())
    }

    pub async fn like(&self, id: Uuid) -> Result<PostRecord, PostServiceError> {
        self.react(id, Reaction::Like).await
    }

    pub async fn dislike(&self, id: Uuid) -> Result<PostRecord, PostServiceError> {
        self.react(id, Reaction::Dislike).await
    }

    async fn react(&self, id: Uuid, reaction: Reaction) -> Result<PostRecord, PostServiceError> {
        let post = self
            .posts
            .react(id, reaction)
            .await
            .map_err(|err| not_found_as::<PostServiceError>("post", err))?;

        self.post_changed(post.id).await;
        Ok(post)
    }

    async fn free_slug(&self, title: &str) -> Result<String, PostServiceError> {
        let posts = self.posts.clone();
        let slug = generate_unique_slug_async(title, move |candidate| {
            let posts = posts.clone();
            let candidate = candidate.to_string();
            async move { posts.slug_exists(&candidate).await.map(|exists| !exists) }
        })
        .await?;
        Ok(slug)
    }

    async fn post_changed(&self, id: Uuid) {
        if let Some(trigger) = &self.cache_trigger {
            trigger.post_changed(Some(&id.to_string())).await;
        }
    }

    async fn ensure_category(&self, category_id: Option<Uuid>) -> Result<(), PostServiceError> {
        let Some(category_id) = category_id else {
            return Ok(());
        };
        if self.categories.find_category(category_id).await?.is_none() {
            return Err(DomainError::validation(format!("unknown category `{category_id}`")).into());
        }
        Ok(())
    }
}

/// Map a repository `NotFound` into a domain not-found for `entity`.
pub(crate) fn not_found_as<E>(entity: &'static str, err: RepoError) -> E
where
    E: From<DomainError> + From<RepoError>,
{
    match err {
        RepoError::NotFound => E::from(DomainError::not_found(entity)),
        other => E::from(other),
    }
}

fn resolve_excerpt(excerpt: Option<&str>, body: &str) -> String {
    match excerpt.map(str::trim).filter(|value| !value.is_empty()) {
        Some(excerpt) => excerpt.to_string(),
        None => body.chars().take(EXCERPT_CHARS).collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::application::repos::CreateCommentParams;
    use crate::cache::{CacheConfig, CacheKey, CacheStore, InvalidationPolicy, MemoryStore};
    use crate::domain::entities::CommentRecord;
    use crate::infra::db::MemoryRepositories;

    /// Comments whose bulk delete always fails.
    struct StuckComments(MemoryRepositories);

    #[async_trait]
    impl CommentsRepo for StuckComments {
        async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError> {
            self.0.list_for_post(post_id).await
        }

        async fn find_comment(&self, id: Uuid) -> Result<Option<CommentRecord>, RepoError> {
            self.0.find_comment(id).await
        }

        async fn create_comment(
            &self,
            params: CreateCommentParams,
        ) -> Result<CommentRecord, RepoError> {
            self.0.create_comment(params).await
        }

        async fn delete_comment(&self, id: Uuid) -> Result<(), RepoError> {
            self.0.delete_comment(id).await
        }

        async fn delete_for_post(&self, _post_id: Uuid) -> Result<u64, RepoError> {
            Err(RepoError::from_persistence("comments table locked"))
        }
    }

    /// Posts whose slug lookups report "free" a fixed number of times,
    /// as a lookup racing another insert would.
    struct StaleSlugLookups {
        inner: MemoryRepositories,
        stale: AtomicUsize,
    }

    #[async_trait]
    impl PostsRepo for StaleSlugLookups {
        async fn list_posts(
            &self,
            filter: &PostQueryFilter,
            page: PageRequest,
        ) -> Result<OffsetPage<PostRecord>, RepoError> {
            self.inner.list_posts(filter, page).await
        }

        async fn find_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
            self.inner.find_post(id).await
        }

        async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
            let stale = self
                .stale
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if stale {
                return Ok(false);
            }
            self.inner.slug_exists(slug).await
        }

        async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
            self.inner.create_post(params).await
        }

        async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
            self.inner.update_post(params).await
        }

        async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
            self.inner.delete_post(id).await
        }

        async fn react(&self, id: Uuid, reaction: Reaction) -> Result<PostRecord, RepoError> {
            self.inner.react(id, reaction).await
        }

        async fn clear_category(&self, category_id: Uuid) -> Result<u64, RepoError> {
            self.inner.clear_category(category_id).await
        }
    }

    fn command(title: &str) -> CreatePostCommand {
        CreatePostCommand {
            title: title.to_string(),
            body: format!("{title} body"),
            excerpt: None,
            category_id: None,
        }
    }

    fn cached(service: PostService) -> (Arc<MemoryStore>, PostService) {
        let config = CacheConfig::default();
        let store = Arc::new(MemoryStore::new(&config));
        let trigger = CacheTrigger::new(config, InvalidationPolicy::new(store.clone()));
        (store, service.with_cache_trigger_opt(Some(Arc::new(trigger))))
    }

    async fn seed(store: &MemoryStore, path: &str) {
        store
            .set(
                &CacheKey::from_request(path, None),
                Bytes::from_static(b"{}"),
                Duration::from_secs(60),
            )
            .await
            .expect("seed entry");
    }

    #[tokio::test]
    async fn delete_purges_cache_even_when_comment_cleanup_fails() {
        let repos = Arc::new(MemoryRepositories::new());
        let (store, service) = cached(PostService::new(
            repos.clone(),
            Arc::new(StuckComments(repos.as_ref().clone())),
            repos.clone(),
        ));
        let post = service.create(command("Doomed")).await.expect("create");
        let id = post.id;
        seed(&store, "/api/posts").await;
        seed(&store, &format!("/api/posts/{id}")).await;
        seed(&store, &format!("/api/comments/post/{id}")).await;

        let result = service.delete(id).await;

        assert!(matches!(
            result,
            Err(PostServiceError::Repo(RepoError::Persistence(_)))
        ));
        assert!(repos.find_post(id).await.expect("lookup").is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_retries_when_slug_is_claimed_after_lookup() {
        let repos = MemoryRepositories::new();
        let first = PostService::new(
            Arc::new(repos.clone()),
            Arc::new(repos.clone()),
            Arc::new(repos.clone()),
        )
        .create(command("Hello"))
        .await
        .expect("first create");
        assert_eq!(first.slug, "hello");

        let racing = PostService::new(
            Arc::new(StaleSlugLookups {
                inner: repos.clone(),
                stale: AtomicUsize::new(1),
            }),
            Arc::new(repos.clone()),
            Arc::new(repos),
        );
        let second = racing.create(command("Hello")).await.expect("second create");

        assert_eq!(second.slug, "hello-2");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_with_same_title_all_succeed() {
        for _ in 0..20 {
            let repos = Arc::new(MemoryRepositories::new());
            let service = Arc::new(PostService::new(repos.clone(), repos.clone(), repos));
            let tasks: Vec<_> = (0..8)
                .map(|_| {
                    let service = service.clone();
                    tokio::spawn(async move { service.create(command("Same Title")).await })
                })
                .collect();

            let mut slugs = HashSet::new();
            for task in tasks {
                let post = task
                    .await
                    .expect("task joins")
                    .expect("create succeeds");
                slugs.insert(post.slug);
            }
            assert_eq!(slugs.len(), 8);
        }
    }

    #[test]
    fn excerpt_falls_back_to_body_prefix() {
        let body = "x".repeat(400);
        assert_eq!(resolve_excerpt(None, &body).len(), EXCERPT_CHARS);
        assert_eq!(resolve_excerpt(Some("   "), "short"), "short");
        assert_eq!(resolve_excerpt(Some(" Teaser "), &body), "Teaser");
    }

    #[test]
    fn not_found_maps_to_domain() {
        let err: PostServiceError = not_found_as("post", RepoError::NotFound);
        assert!(matches!(
            err,
            PostServiceError::Domain(DomainError::NotFound { entity: "post" })
        ));

        let err: PostServiceError = not_found_as("post", RepoError::Persistence("down".into()));
        assert!(matches!(err, PostServiceError::Repo(_)));
    }
}
