//! Comments handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::comments::CreateCommentCommand;

use super::comment_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_comments(
    State(state): State<ApiState>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = state
        .comments
        .list_for_post(post_id)
        .await
        .map_err(comment_to_api)?;

    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<ApiState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CommentCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreateCommentCommand {
        post_id,
        author: payload.author,
        body: payload.body,
    };

    let comment = state
        .comments
        .create(command)
        .await
        .map_err(comment_to_api)?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.comments.delete(id).await.map_err(comment_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
