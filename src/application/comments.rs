//! Comment service. Comment views are cached per post, so every write
//! invalidates by the owning post id.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::posts::not_found_as;
use crate::application::repos::{CommentsRepo, CreateCommentParams, PostsRepo, RepoError};
use crate::cache::CacheTrigger;
use crate::domain::entities::CommentRecord;
use crate::domain::error::{DomainError, require_text};

#[derive(Debug, Error)]
pub enum CommentServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateCommentCommand {
    pub post_id: Uuid,
    pub author: String,
    pub body: String,
}

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentsRepo>,
    posts: Arc<dyn PostsRepo>,
    cache_trigger: Option<Arc<CacheTrigger>>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentsRepo>, posts: Arc<dyn PostsRepo>) -> Self {
        Self {
            comments,
            posts,
            cache_trigger: None,
        }
    }

    /// Set the cache trigger for this service (optional).
    pub fn with_cache_trigger_opt(mut self, trigger: Option<Arc<CacheTrigger>>) -> Self {
        self.cache_trigger = trigger;
        self
    }

    pub async fn list_for_post(
        &self,
        post_id: Uuid,
    ) -> Result<Vec<CommentRecord>, CommentServiceError> {
        self.ensure_post(post_id).await?;
        self.comments
            .list_for_post(post_id)
            .await
            .map_err(CommentServiceError::from)
    }

    pub async fn create(
        &self,
        command: CreateCommentCommand,
    ) -> Result<CommentRecord, CommentServiceError> {
        let author = require_text("author", &command.author)?;
        let body = require_text("body", &command.body)?;
        self.ensure_post(command.post_id).await?;

        let comment = self
            .comments
            .create_comment(CreateCommentParams {
                post_id: command.post_id,
                author,
                body,
            })
            .await?;
        info!(comment_id = %comment.id, post_id = %comment.post_id, "comment created");

        self.comments_changed(comment.post_id).await;
        Ok(comment)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), CommentServiceError> {
        let comment = self
            .comments
            .find_comment(id)
            .await?
            .ok_or(DomainError::not_found("comment"))?;

        self.comments
            .delete_comment(id)
            .await
            .map_err(|err| not_found_as::<CommentServiceError>("comment", err))?;

        self.comments_changed(comment.post_id).await;
        Ok(())
    }

    async fn comments_changed(&self, post_id: Uuid) {
        if let Some(trigger) = &self.cache_trigger {
            trigger.comments_changed(Some(&post_id.to_string())).await;
        }
    }

    async fn ensure_post(&self, post_id: Uuid) -> Result<(), CommentServiceError> {
        match self.posts.find_post(post_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("post").into()),
        }
    }
}
