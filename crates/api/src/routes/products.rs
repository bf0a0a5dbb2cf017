//! Product route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use store_core::ProductId;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{Created, created};
use crate::dto::{ProductDto, ProductRequest};
use crate::error::Result;
use crate::services::ProductService;
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category_id: Option<i64>,
}

/// `GET /products`
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> Result<Json<Vec<ProductDto>>> {
    let products = ProductService::new(state.store())
        .list(filter.category_id)
        .await?;
    Ok(Json(products))
}

/// `GET /products/{id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ProductDto>> {
    let product = ProductService::new(state.store())
        .get(ProductId::new(id))
        .await?;
    Ok(Json(product))
}

/// `POST /products`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ProductRequest>,
) -> Result<Created<ProductDto>> {
    let product = ProductService::new(state.store()).create(&request).await?;
    Ok(created(format!("/products/{}", product.id), product))
}

/// `PUT /products/{id}`
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<ProductRequest>,
) -> Result<Json<ProductDto>> {
    let product = ProductService::new(state.store())
        .update(ProductId::new(id), &request)
        .await?;
    Ok(Json(product))
}

/// `DELETE /products/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode> {
    ProductService::new(state.store())
        .delete(ProductId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
