//! Category route handlers.

use axum::{Json, extract::State, http::StatusCode};

use super::extract::{ApiJson, ApiPath};
use super::{Created, created};
use crate::dto::{CategoryDto, CategoryRequest};
use crate::error::Result;
use crate::services::CategoryService;
use crate::state::AppState;

/// `GET /categories`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<CategoryDto>>> {
    Ok(Json(CategoryService::new(state.store()).list().await?))
}

/// `GET /categories/{id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<CategoryDto>> {
    Ok(Json(CategoryService::new(state.store()).get(id).await?))
}

/// `POST /categories`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> Result<Created<CategoryDto>> {
    let category = CategoryService::new(state.store()).create(&request).await?;
    Ok(created(format!("/categories/{}", category.id), category))
}

/// `PUT /categories/{id}`
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> Result<Json<CategoryDto>> {
    Ok(Json(
        CategoryService::new(state.store())
            .update(id, &request)
            .await?,
    ))
}

/// `DELETE /categories/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode> {
    CategoryService::new(state.store()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
