use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CommentsRepo, CreateCommentParams, RepoError};
use crate::domain::entities::CommentRecord;

use super::MemoryRepositories;

#[async_trait]
impl CommentsRepo for MemoryRepositories {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError> {
        let mut comments: Vec<CommentRecord> = self
            .comments
            .iter()
            .filter(|entry| entry.post_id == post_id)
            .map(|entry| entry.value().clone())
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<CommentRecord>, RepoError> {
        Ok(self.comments.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let record = CommentRecord {
            id: Uuid::new_v4(),
            post_id: params.post_id,
            author: params.author,
            body: params.body,
            created_at: OffsetDateTime::now_utc(),
        };
        self.comments.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<(), RepoError> {
        self.comments
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn delete_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let before = self.comments.len();
        self.comments.retain(|_, comment| comment.post_id != post_id);
        Ok(before.saturating_sub(self.comments.len()) as u64)
    }
}
