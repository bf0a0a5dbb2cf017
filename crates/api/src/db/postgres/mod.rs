//! `PostgreSQL` implementation of the repository traits.
//!
//! Queries are built at runtime with `sqlx::query_as` and decoded into private
//! row types, then converted into `store_core` entities. Related collections
//! (a category's product ids, a user's favourites) are fetched with `ARRAY`
//! subqueries so each read sees a single snapshot.

mod addresses;
mod categories;
mod products;
mod users;

use async_trait::async_trait;
use sqlx::PgPool;

use super::{RepositoryError, Store};

/// SQLSTATE raised when an identity sequence runs past its `MAXVALUE`.
const SEQUENCE_LIMIT_EXCEEDED: &str = "2200H";

/// Repository backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Translate constraint failures on writes into `Conflict`.
fn map_write_error(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("{what} already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Conflict(format!("{what} is referenced or references a missing row"));
        }
        if db_err.is_check_violation()
            || db_err.code().as_deref() == Some(SEQUENCE_LIMIT_EXCEEDED)
        {
            return RepositoryError::Conflict(format!("{what} is out of range"));
        }
    }
    RepositoryError::Database(err)
}

/// Whether the error is a foreign-key violation.
fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}
