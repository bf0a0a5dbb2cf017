//! User, address and favourite route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use store_core::{AddressId, ProductId, UserId};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{Created, created};
use crate::dto::{
    AddressDto, AddressRequest, ChangePasswordRequest, ProductDto, RegisterUserRequest,
    UpdateUserRequest, UserDto,
};
use crate::error::Result;
use crate::services::UserService;
use crate::state::AppState;

/// Query parameters for the user listing.
#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    /// `name` (default) or `email`; anything else falls back to `name`.
    pub sort: Option<String>,
}

fn service(state: &AppState) -> UserService<'_> {
    UserService::new(state.store(), state.hasher())
}

/// `GET /users`
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> Result<Json<Vec<UserDto>>> {
    Ok(Json(service(&state).list(query.sort.as_deref()).await?))
}

/// `GET /users/{id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserDto>> {
    Ok(Json(service(&state).get(UserId::new(id)).await?))
}

/// `POST /users`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterUserRequest>,
) -> Result<Created<UserDto>> {
    let user = service(&state).register(&request).await?;
    Ok(created(format!("/users/{}", user.id), user))
}

/// `PUT /users/{id}`
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserDto>> {
    Ok(Json(service(&state).update(UserId::new(id), &request).await?))
}

/// `DELETE /users/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode> {
    service(&state).delete(UserId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /users/{id}/change-password`
pub async fn change_password(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> Result<StatusCode> {
    service(&state)
        .change_password(UserId::new(id), &request)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /users/{id}/addresses`
pub async fn addresses(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<AddressDto>>> {
    Ok(Json(service(&state).addresses(UserId::new(id)).await?))
}

/// `POST /users/{id}/addresses`
pub async fn add_address(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<AddressRequest>,
) -> Result<Created<AddressDto>> {
    let address = service(&state)
        .add_address(UserId::new(id), &request)
        .await?;
    let location = address.id.map_or_else(
        || format!("/users/{id}/addresses"),
        |address_id| format!("/users/{id}/addresses/{address_id}"),
    );
    Ok(created(location, address))
}

/// `DELETE /users/{id}/addresses/{addressId}`
pub async fn remove_address(
    State(state): State<AppState>,
    ApiPath((id, address_id)): ApiPath<(i64, i64)>,
) -> Result<StatusCode> {
    service(&state)
        .remove_address(UserId::new(id), AddressId::new(address_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /users/{id}/favorites`
pub async fn favorites(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<ProductDto>>> {
    Ok(Json(service(&state).favorites(UserId::new(id)).await?))
}

/// `PUT /users/{id}/favorites/{productId}`
pub async fn add_favorite(
    State(state): State<AppState>,
    ApiPath((id, product_id)): ApiPath<(i64, i64)>,
) -> Result<StatusCode> {
    service(&state)
        .add_favorite(UserId::new(id), ProductId::new(product_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /users/{id}/favorites/{productId}`
pub async fn remove_favorite(
    State(state): State<AppState>,
    ApiPath((id, product_id)): ApiPath<(i64, i64)>,
) -> Result<StatusCode> {
    service(&state)
        .remove_favorite(UserId::new(id), ProductId::new(product_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
