//! Categories handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use super::category_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_categories(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.categories.list().await.map_err(category_to_api)?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<ApiState>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories
        .create(&payload.name)
        .await
        .map_err(category_to_api)?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories
        .rename(id, &payload.name)
        .await
        .map_err(category_to_api)?;

    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.categories.delete(id).await.map_err(category_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
