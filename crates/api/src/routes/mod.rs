//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                  - Liveness
//! GET    /health/ready                            - Readiness (store ping)
//!
//! # Products
//! GET    /products[?categoryId=]                  - List, optionally by category
//! POST   /products                                - Create (201 + Location)
//! GET    /products/{id}                           - Detail
//! PUT    /products/{id}                           - Replace fields and category
//! DELETE /products/{id}                           - Delete (204)
//!
//! # Categories
//! GET    /categories                              - List
//! POST   /categories                              - Create (201 + Location)
//! GET    /categories/{id}                         - Detail
//! PUT    /categories/{id}                         - Rename
//! DELETE /categories/{id}                         - Delete if empty (204, 409)
//!
//! # Users
//! GET    /users[?sort=name|email]                 - List
//! POST   /users                                   - Register (201 + Location)
//! GET    /users/{id}                              - Detail
//! PUT    /users/{id}                              - Update name and email
//! DELETE /users/{id}                              - Delete with addresses (204)
//! POST   /users/{id}/change-password              - Change password (204, 401)
//! GET    /users/{id}/addresses                    - Address list
//! POST   /users/{id}/addresses                    - Add address (201 + Location)
//! DELETE /users/{id}/addresses/{addressId}        - Remove address (204)
//! GET    /users/{id}/favorites                    - Favourite products
//! PUT    /users/{id}/favorites/{productId}        - Add favourite (204)
//! DELETE /users/{id}/favorites/{productId}        - Remove favourite (204)
//! ```

pub mod categories;
pub mod extract;
pub mod health;
pub mod products;
pub mod users;

use axum::{
    Json, Router,
    http::{HeaderName, StatusCode, Uri, header},
    routing::{get, post, put},
};

use crate::error::AppError;
use crate::state::AppState;

/// A 201 response with a `Location` header.
pub type Created<T> = (StatusCode, [(HeaderName, String); 1], Json<T>);

fn created<T>(location: String, body: T) -> Created<T> {
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(body),
    )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::destroy),
        )
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::create))
        .route(
            "/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
        .route("/{id}/change-password", post(users::change_password))
        .route(
            "/{id}/addresses",
            get(users::addresses).post(users::add_address),
        )
        .route(
            "/{id}/addresses/{address_id}",
            axum::routing::delete(users::remove_address),
        )
        .route("/{id}/favorites", get(users::favorites))
        .route(
            "/{id}/favorites/{product_id}",
            put(users::add_favorite).delete(users::remove_favorite),
        )
}

/// Build all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/users", user_routes())
        .fallback(fallback)
}

async fn fallback(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
