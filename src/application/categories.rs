//! Category service. Post list views embed category data, so every
//! category write also purges post lists.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::posts::not_found_as;
use crate::application::repos::{
    CategoriesRepo, CreateCategoryParams, PostsRepo, RepoError, UpdateCategoryParams,
};
use crate::cache::CacheTrigger;
use crate::domain::entities::CategoryRecord;
use crate::domain::error::{DomainError, require_text};
use crate::domain::slug::derive_slug;

#[derive(Debug, Error)]
pub enum CategoryServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoriesRepo>,
    posts: Arc<dyn PostsRepo>,
    cache_trigger: Option<Arc<CacheTrigger>>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoriesRepo>, posts: Arc<dyn PostsRepo>) -> Self {
        Self {
            categories,
            posts,
            cache_trigger: None,
        }
    }

    /// Set the cache trigger for this service (optional).
    pub fn with_cache_trigger_opt(mut self, trigger: Option<Arc<CacheTrigger>>) -> Self {
        self.cache_trigger = trigger;
        self
    }

    pub async fn list(&self) -> Result<Vec<CategoryRecord>, CategoryServiceError> {
        self.categories
            .list_categories()
            .await
            .map_err(CategoryServiceError::from)
    }

    pub async fn create(&self, name: &str) -> Result<CategoryRecord, CategoryServiceError> {
        let (name, slug) = name_and_slug(name)?;
        let category = self
            .categories
            .create_category(CreateCategoryParams { name, slug })
            .await
            .map_err(duplicate_as_conflict)?;
        info!(category_id = %category.id, slug = %category.slug, "category created");

        self.category_changed().await;
        Ok(category)
    }

    pub async fn rename(
        &self,
        id: Uuid,
        name: &str,
    ) -> Result<CategoryRecord, CategoryServiceError> {
        let (name, slug) = name_and_slug(name)?;
        let category = self
            .categories
            .update_category(UpdateCategoryParams { id, name, slug })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { .. } => duplicate_as_conflict(err),
                other => not_found_as::<CategoryServiceError>("category", other),
            })?;

        self.category_changed().await;
        Ok(category)
    }

    /// Delete a category and detach it from every post that referenced it.
    pub async fn delete(&self, id: Uuid) -> Result<(), CategoryServiceError> {
        self.categories
            .delete_category(id)
            .await
            .map_err(|err| not_found_as::<CategoryServiceError>("category", err))?;
        let detached_posts = self.posts.clear_category(id).await;
        self.category_changed().await;

        let detached_posts = detached_posts?;
        info!(category_id = %id, detached_posts, "category deleted");
        Ok(())
    }

    async fn category_changed(&self) {
        if let Some(trigger) = &self.cache_trigger {
            trigger.category_changed().await;
        }
    }
}

fn name_and_slug(name: &str) -> Result<(String, String), CategoryServiceError> {
    let name = require_text("name", name)?;
    let slug = derive_slug(&name).map_err(|err| DomainError::validation(err.to_string()))?;
    Ok((name, slug))
}

fn duplicate_as_conflict(err: RepoError) -> CategoryServiceError {
    match err {
        RepoError::Duplicate { constraint } => {
            DomainError::conflict("category", format!("`{constraint}` is already taken")).into()
        }
        other => other.into(),
    }
}
