//! Request orchestration.
//!
//! Services validate input, resolve referenced entities, apply changes
//! through the relationship manager and persist through the [`Store`]. They
//! return typed outcomes; mapping to HTTP lives in [`crate::error`].
//!
//! [`Store`]: crate::db::Store

pub mod accounts;
pub mod catalog;
pub mod password;
pub mod validation;

use thiserror::Error;

use crate::db::RepositoryError;

pub use accounts::UserService;
pub use catalog::{CategoryService, ProductService};
pub use password::CredentialHasher;
pub use validation::ValidationErrors;

/// Errors returned by services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The addressed entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind, e.g. "product".
        entity: &'static str,
        /// Identifier as the client sent it.
        id: String,
    },

    /// A referenced entity (e.g. the product's category) does not exist.
    #[error("invalid {field}: {message}")]
    InvalidReference {
        /// Request field carrying the reference.
        field: &'static str,
        /// Client-facing message.
        message: String,
    },

    /// Credential mismatch.
    #[error("invalid credentials")]
    Unauthorized,

    /// Malformed input.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The operation would break a dependency (e.g. deleting a used category).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Password hashing failed.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
