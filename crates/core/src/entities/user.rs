//! Store users.

use std::collections::BTreeSet;
use std::fmt;

use crate::entities::Address;
use crate::types::{Email, ProductId, UserId};

/// A registered user.
///
/// `password_hash` is an opaque credential (an argon2 PHC string). It is never
/// part of any outward representation and is redacted from `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    /// Addresses owned by this user. Duplicates are allowed.
    pub addresses: Vec<Address>,
    /// Favourite products. Non-owning; products exist independently.
    pub favorite_products: BTreeSet<ProductId>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("addresses", &self.addresses)
            .field("favorite_products", &self.favorite_products)
            .finish()
    }
}

impl User {
    /// Build a user with no addresses or favourites.
    #[must_use]
    pub fn new(id: UserId, input: NewUser) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            addresses: Vec::new(),
            favorite_products: BTreeSet::new(),
        }
    }
}

/// Fields supplied when registering a user. The password is already hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// The profile fields an update may replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub name: String,
    pub email: Email,
}

/// Copy the mutable profile fields onto `user`.
///
/// The credential is only changed through the password-change flow.
pub fn apply_user_update(user: &mut User, changes: UserChanges) {
    user.name = changes.name;
    user.email = changes.email;
}
