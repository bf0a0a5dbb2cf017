use serde::{Deserialize, Serialize};

use store_core::{Email, User, UserChanges, UserId};

use crate::services::validation::{self, ValidationErrors, required_text};

/// User as returned to clients. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Body of `POST /users`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl RegisterUserRequest {
    /// Validated name and email. The password is only length-checked; it is
    /// hashed by the caller.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<UserChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", "Name", &self.name);
        let email = validation::email(&mut errors, "email", &self.email);
        validation::password(&mut errors, "password", &self.password);
        errors.finish()?;

        email
            .map(|email| UserChanges { name, email })
            .ok_or_else(|| ValidationErrors::single("email", "Email must be valid."))
    }
}

/// Body of `PUT /users/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
}

impl UpdateUserRequest {
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<UserChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", "Name", &self.name);
        let email = validation::email(&mut errors, "email", &self.email);
        errors.finish()?;

        email
            .map(|email| UserChanges { name, email })
            .ok_or_else(|| ValidationErrors::single("email", "Email must be valid."))
    }
}

/// Body of `POST /users/{id}/change-password`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePasswordRequest")
            .field("old_password", &"[REDACTED]")
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}

impl ChangePasswordRequest {
    /// Only the new password is policy-checked; the old one just has to match.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validation::password(&mut errors, "newPassword", &self.new_password);
        errors.finish()
    }
}
