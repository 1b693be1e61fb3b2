use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CategoriesRepo, CreateCategoryParams, RepoError, UpdateCategoryParams,
};
use crate::domain::entities::CategoryRecord;

use super::{CATEGORY_SLUG_CONSTRAINT, MemoryRepositories};

impl MemoryRepositories {
    fn claim_category_slug(&self, slug: &str, id: Uuid) -> Result<(), RepoError> {
        match self.category_slugs.entry(slug.to_string()) {
            Entry::Occupied(owner) if *owner.get() != id => {
                Err(RepoError::duplicate(CATEGORY_SLUG_CONSTRAINT))
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(vacant) => {
                vacant.insert(id);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl CategoriesRepo for MemoryRepositories {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let mut categories: Vec<CategoryRecord> = self
            .categories
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        categories.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        Ok(self.categories.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let id = Uuid::new_v4();
        self.claim_category_slug(&params.slug, id)?;

        let record = CategoryRecord {
            id,
            name: params.name,
            slug: params.slug,
            created_at: OffsetDateTime::now_utc(),
        };
        self.categories.insert(id, record.clone());
        Ok(record)
    }

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let previous_slug = self
            .categories
            .get(&params.id)
            .map(|entry| entry.slug.clone())
            .ok_or(RepoError::NotFound)?;
        self.claim_category_slug(&params.slug, params.id)?;

        let mut category = self.categories.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        category.name = params.name;
        category.slug = params.slug;
        let updated = category.clone();
        drop(category);

        if previous_slug != updated.slug {
            self.category_slugs.remove(&previous_slug);
        }
        Ok(updated)
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), RepoError> {
        let (_, category) = self.categories.remove(&id).ok_or(RepoError::NotFound)?;
        self.category_slugs.remove(&category.slug);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str, slug: &str) -> CreateCategoryParams {
        CreateCategoryParams {
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }

    #[tokio::test]
    async fn slugs_are_unique() {
        let repo = MemoryRepositories::new();
        repo.create_category(create("Rust", "rust")).await.expect("create");

        let err = repo
            .create_category(create("RUST", "rust"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, RepoError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn rename_moves_the_slug_claim() {
        let repo = MemoryRepositories::new();
        let category = repo.create_category(create("Rust", "rust")).await.expect("create");

        repo.update_category(UpdateCategoryParams {
            id: category.id,
            name: "Go".to_string(),
            slug: "go".to_string(),
        })
        .await
        .expect("rename");

        repo.create_category(create("Rust", "rust"))
            .await
            .expect("old slug released");
        assert!(
            repo.create_category(create("Go", "go")).await.is_err(),
            "new slug claimed"
        );
    }

    #[tokio::test]
    async fn rename_to_same_slug_is_allowed() {
        let repo = MemoryRepositories::new();
        let category = repo.create_category(create("Rust", "rust")).await.expect("create");

        let renamed = repo
            .update_category(UpdateCategoryParams {
                id: category.id,
                name: "rust".to_string(),
                slug: "rust".to_string(),
            })
            .await
            .expect("rename");
        assert_eq!(renamed.name, "rust");
    }

    #[tokio::test]
    async fn list_is_sorted_by_slug() {
        let repo = MemoryRepositories::new();
        repo.create_category(create("Zig", "zig")).await.expect("create");
        repo.create_category(create("Ada", "ada")).await.expect("create");

        let slugs: Vec<String> = repo
            .list_categories()
            .await
            .expect("list")
            .into_iter()
            .map(|category| category.slug)
            .collect();
        assert_eq!(slugs, vec!["ada", "zig"]);
    }
}
