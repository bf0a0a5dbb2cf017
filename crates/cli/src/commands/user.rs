//! User management commands.

use store_api::config::PasswordConfig;
use store_api::db::postgres::PgStore;
use store_api::dto::RegisterUserRequest;
use store_api::services::{CredentialHasher, UserService};
use store_core::UserId;

/// Register a user through the same validation and hashing as `POST /users`.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the input is rejected
/// (invalid email, password policy, email already registered).
pub async fn create(
    email: &str,
    name: &str,
    password: &str,
) -> Result<UserId, Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let store = PgStore::new(pool);
    let hasher =
        CredentialHasher::new(&PasswordConfig::default()).map_err(|e| e.to_string())?;

    let request = RegisterUserRequest {
        name: name.to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
    };
    let user = UserService::new(&store, &hasher).register(&request).await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}
