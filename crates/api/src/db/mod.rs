//! Data access for the store.
//!
//! Each entity gets a repository trait; [`Store`] bundles them so handlers can
//! hold a single `Arc<dyn Store>`. Two implementations exist:
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemoryStore`] - `RwLock`-guarded maps (tests, local demos)
//!
//! ## Tables (schema `store`)
//!
//! - `category` - `SMALLINT` ids bounded to 0-255
//! - `product` - references `category`, `NUMERIC(10, 2)` prices
//! - `app_user` - unique email, argon2 PHC password hash
//! - `address` - owned by `app_user`, cascades on user delete
//! - `favorite_product` - user/product join table, cascades on both sides
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p store-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use store_core::{
    Address, AddressId, Category, CategoryId, Email, NewProduct, NewUser, Product, ProductId,
    ProductWithCategory, User, UserId,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, category still in use).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Sort key for the user listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSort {
    /// Alphabetical by name (the default).
    #[default]
    Name,
    /// Alphabetical by email.
    Email,
}

impl UserSort {
    /// Interpret a `sort` query parameter. Unknown or missing values fall back
    /// to [`UserSort::Name`].
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(field) if field.eq_ignore_ascii_case("email") => Self::Email,
            _ => Self::Name,
        }
    }
}

/// Persistence for categories.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by id, each with its product ids.
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;

    /// Resolve a category together with the ids of the products it groups.
    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;

    /// Insert a category with the next free id.
    ///
    /// Returns `Conflict` once all 256 ids are taken.
    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError>;

    /// Rename a category. Returns `NotFound` if it does not exist.
    async fn update_category(&self, id: CategoryId, name: &str)
    -> Result<Category, RepositoryError>;

    /// Delete a category. Returns `Conflict` while products still reference it.
    async fn delete_category(&self, id: CategoryId) -> Result<bool, RepositoryError>;
}

/// Persistence for products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product joined with its category, ordered by product id.
    async fn list_products_with_category(
        &self,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError>;

    /// Products in one category joined with it, ordered by product id.
    async fn list_products_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError>;

    /// Resolve a product by id.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Resolve a product and its category in one lookup.
    async fn get_product_with_category(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductWithCategory>, RepositoryError>;

    /// Insert a product. The category must exist.
    async fn create_product(&self, input: &NewProduct) -> Result<Product, RepositoryError>;

    /// Overwrite the stored product with `product`. Returns `NotFound` if it
    /// does not exist.
    async fn update_product(&self, product: &Product) -> Result<Product, RepositoryError>;

    /// Delete a product and every favourite pointing at it.
    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

/// Persistence for users and their favourites.
///
/// Users are returned with `addresses` and `favorite_products` loaded.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users in the requested order, ties broken by id.
    async fn list_users(&self, sort: UserSort) -> Result<Vec<User>, RepositoryError>;

    /// Resolve a user by id.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Resolve a user by exact email.
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Insert a user. Returns `Conflict` if the email is taken.
    async fn create_user(&self, input: &NewUser) -> Result<User, RepositoryError>;

    /// Persist name, email and password hash. Addresses and favourites are
    /// written through their own operations.
    async fn update_user(&self, user: &User) -> Result<User, RepositoryError>;

    /// Delete a user along with its addresses and favourites.
    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError>;

    /// Record a favourite. Adding an existing favourite is a no-op.
    async fn add_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError>;

    /// Remove a favourite. Returns whether a row was removed.
    async fn remove_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError>;
}

/// Persistence for addresses.
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Insert an address. `address.user_id` must be set.
    async fn create_address(&self, address: &Address) -> Result<Address, RepositoryError>;

    /// Delete an address by id.
    async fn delete_address(&self, id: AddressId) -> Result<bool, RepositoryError>;
}

/// Everything the HTTP layer needs from persistence.
#[async_trait]
pub trait Store: UserRepository + AddressRepository + CategoryRepository + ProductRepository {
    /// Cheap connectivity check for the readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_sort_from_param() {
        assert_eq!(UserSort::from_param(Some("email")), UserSort::Email);
        assert_eq!(UserSort::from_param(Some("EMAIL")), UserSort::Email);
        assert_eq!(UserSort::from_param(Some("name")), UserSort::Name);
        assert_eq!(UserSort::from_param(Some("password")), UserSort::Name);
        assert_eq!(UserSort::from_param(None), UserSort::Name);
    }
}
