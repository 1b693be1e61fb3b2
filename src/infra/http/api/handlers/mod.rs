//! API handlers organized by resource type.
//!
//! Helper functions for error conversion are defined here and shared across modules.

mod categories;
mod comments;
mod posts;

pub use categories::*;
pub use comments::*;
pub use posts::*;

// ----- Shared query structs -----

use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<Uuid>,
}

// ----- Shared error conversions -----

use axum::http::StatusCode;

use crate::application::categories::CategoryServiceError;
use crate::application::comments::CommentServiceError;
use crate::application::posts::PostServiceError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

use super::error::{ApiError, codes};

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::Persistence(msg) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(msg),
        ),
    }
}

pub(crate) fn domain_to_api(err: DomainError) -> ApiError {
    match err {
        DomainError::NotFound { entity } => ApiError::not_found(not_found_message(entity)),
        DomainError::Validation { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        DomainError::Conflict { message, .. } => ApiError::new(
            StatusCode::CONFLICT,
            codes::CONFLICT,
            "Resource already exists",
            Some(message),
        ),
    }
}

pub(crate) fn post_to_api(err: PostServiceError) -> ApiError {
    match err {
        PostServiceError::Domain(domain) => domain_to_api(domain),
        PostServiceError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn comment_to_api(err: CommentServiceError) -> ApiError {
    match err {
        CommentServiceError::Domain(domain) => domain_to_api(domain),
        CommentServiceError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn category_to_api(err: CategoryServiceError) -> ApiError {
    match err {
        CategoryServiceError::Domain(domain) => domain_to_api(domain),
        CategoryServiceError::Repo(repo) => repo_to_api(repo),
    }
}

fn not_found_message(entity: &'static str) -> &'static str {
    match entity {
        "post" => "post not found",
        "comment" => "comment not found",
        "category" => "category not found",
        _ => "resource not found",
    }
}
