//! Posts handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::posts::{CreatePostCommand, UpdatePostCommand};
use crate::application::repos::PostQueryFilter;

use super::{PostListQuery, post_to_api};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_posts(
    State(state): State<ApiState>,
    Query(query): Query<PostListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = PostQueryFilter {
        category_id: query.category,
    };
    let page = state
        .posts
        .list(&filter, PageRequest::new(query.page, query.limit))
        .await
        .map_err(post_to_api)?;

    Ok(Json(page))
}

pub async fn get_post(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.get(id).await.map_err(post_to_api)?;
    Ok(Json(post))
}

pub async fn create_post(
    State(state): State<ApiState>,
    Json(payload): Json<PostCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreatePostCommand {
        title: payload.title,
        body: payload.body,
        excerpt: payload.excerpt,
        category_id: payload.category_id,
    };

    let post = state.posts.create(command).await.map_err(post_to_api)?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdatePostCommand {
        id,
        title: payload.title,
        body: payload.body,
        excerpt: payload.excerpt,
        category_id: payload.category_id,
    };

    let post = state.posts.update(command).await.map_err(post_to_api)?;

    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.posts.delete(id).await.map_err(post_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn like_post(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.like(id).await.map_err(post_to_api)?;
    Ok(Json(post))
}

pub async fn dislike_post(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.dislike(id).await.map_err(post_to_api)?;
    Ok(Json(post))
}
