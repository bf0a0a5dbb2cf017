//! User accounts, their addresses and favourite products.

use store_core::{
    Address, AddressId, Email, NewUser, ProductId, User, UserId,
    apply_user_update,
    relationships::{add_address, add_favorite_product, remove_address, remove_favorite_product},
};

use super::{CredentialHasher, ServiceError, ValidationErrors};
use crate::db::{RepositoryError, Store, UserSort};
use crate::dto::{
    AddressDto, AddressRequest, ChangePasswordRequest, ProductDto, RegisterUserRequest,
    UpdateUserRequest, UserDto,
};

const EMAIL_TAKEN: &str = "Email is already registered.";

/// User operations.
pub struct UserService<'a> {
    store: &'a dyn Store,
    hasher: &'a CredentialHasher,
}

impl<'a> UserService<'a> {
    /// Create a new user service.
    #[must_use]
    pub const fn new(store: &'a dyn Store, hasher: &'a CredentialHasher) -> Self {
        Self { store, hasher }
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for malformed input or an email that
    /// is already registered.
    pub async fn register(&self, request: &RegisterUserRequest) -> Result<UserDto, ServiceError> {
        let changes = request.validate()?;
        self.ensure_email_free(&changes.email, None).await?;

        let password_hash = self
            .hasher
            .hash(&request.password)
            .map_err(|_| ServiceError::PasswordHash)?;
        let input = NewUser {
            name: changes.name,
            email: changes.email,
            password_hash,
        };
        let user = self
            .store
            .create_user(&input)
            .await
            .map_err(map_email_conflict)?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(UserDto::from(&user))
    }

    /// List users sorted by `name` (default) or `email`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list(&self, sort: Option<&str>) -> Result<Vec<UserDto>, ServiceError> {
        let users = self.store.list_users(UserSort::from_param(sort)).await?;
        Ok(users.iter().map(UserDto::from).collect())
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    pub async fn get(&self, id: UserId) -> Result<UserDto, ServiceError> {
        Ok(UserDto::from(&self.load(id).await?))
    }

    /// Change name and email.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist and
    /// `ServiceError::Validation` for malformed input or an email owned by
    /// someone else.
    pub async fn update(
        &self,
        id: UserId,
        request: &UpdateUserRequest,
    ) -> Result<UserDto, ServiceError> {
        let changes = request.validate()?;
        let mut user = self.load(id).await?;
        self.ensure_email_free(&changes.email, Some(id)).await?;

        apply_user_update(&mut user, changes);
        let user = self.save(&user).await?;

        tracing::info!(user_id = %id, "user updated");
        Ok(UserDto::from(&user))
    }

    /// Delete a user together with the addresses and favourites it owns.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    pub async fn delete(&self, id: UserId) -> Result<(), ServiceError> {
        if !self.store.delete_user(id).await? {
            return Err(ServiceError::not_found("user", id));
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Replace the password after verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist,
    /// `ServiceError::Unauthorized` if `oldPassword` does not match and
    /// `ServiceError::Validation` if the new password breaks the policy.
    pub async fn change_password(
        &self,
        id: UserId,
        request: &ChangePasswordRequest,
    ) -> Result<(), ServiceError> {
        request.validate()?;
        let mut user = self.load(id).await?;

        if !self.hasher.verify(&request.old_password, &user.password_hash) {
            tracing::warn!(user_id = %id, "password change rejected: old password mismatch");
            return Err(ServiceError::Unauthorized);
        }

        user.password_hash = self
            .hasher
            .hash(&request.new_password)
            .map_err(|_| ServiceError::PasswordHash)?;
        self.save(&user).await?;

        tracing::info!(user_id = %id, "password changed");
        Ok(())
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    pub async fn addresses(&self, id: UserId) -> Result<Vec<AddressDto>, ServiceError> {
        let user = self.load(id).await?;
        Ok(user.addresses.iter().map(AddressDto::from).collect())
    }

    /// Attach a new address to the user.
    ///
    /// Identical addresses are stored again, not merged.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist and
    /// `ServiceError::Validation` for malformed input.
    pub async fn add_address(
        &self,
        id: UserId,
        request: &AddressRequest,
    ) -> Result<AddressDto, ServiceError> {
        let input = request.validate()?;
        let mut user = self.load(id).await?;

        let mut address = Address::detached(input);
        add_address(&mut user, &mut address);
        let saved = self
            .store
            .create_address(&address)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::not_found("user", id),
                other => other.into(),
            })?;

        tracing::info!(user_id = %id, address_id = ?saved.id, "address added");
        Ok(AddressDto::from(&saved))
    }

    /// Detach and delete one of the user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist or does not
    /// own the address.
    pub async fn remove_address(
        &self,
        id: UserId,
        address_id: AddressId,
    ) -> Result<(), ServiceError> {
        let mut user = self.load(id).await?;
        let mut address = user
            .addresses
            .iter()
            .find(|candidate| candidate.id == Some(address_id))
            .cloned()
            .ok_or_else(|| ServiceError::not_found("address", address_id))?;

        remove_address(&mut user, &mut address);
        if !self.store.delete_address(address_id).await? {
            return Err(ServiceError::not_found("address", address_id));
        }

        tracing::info!(user_id = %id, %address_id, "address removed");
        Ok(())
    }

    // =========================================================================
    // Favourites
    // =========================================================================

    /// The user's favourite products, ordered by product id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    pub async fn favorites(&self, id: UserId) -> Result<Vec<ProductDto>, ServiceError> {
        let user = self.load(id).await?;
        let mut favorites = Vec::with_capacity(user.favorite_products.len());
        for product_id in &user.favorite_products {
            if let Some(joined) = self.store.get_product_with_category(*product_id).await? {
                favorites.push(ProductDto::from(&joined));
            }
        }
        Ok(favorites)
    }

    /// Mark a product as a favourite. Repeating the call changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user or product does not exist.
    pub async fn add_favorite(&self, id: UserId, product_id: ProductId) -> Result<(), ServiceError> {
        let mut user = self.load(id).await?;
        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", product_id))?;

        if add_favorite_product(&mut user, &product) {
            self.store
                .add_favorite(id, product_id)
                .await
                .map_err(|e| match e {
                    RepositoryError::NotFound => ServiceError::not_found("product", product_id),
                    other => other.into(),
                })?;
            tracing::info!(user_id = %id, %product_id, "favorite added");
        }
        Ok(())
    }

    /// Remove a favourite. Removing a product that is not a favourite is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    pub async fn remove_favorite(
        &self,
        id: UserId,
        product_id: ProductId,
    ) -> Result<(), ServiceError> {
        let mut user = self.load(id).await?;
        if remove_favorite_product(&mut user, product_id) {
            self.store.remove_favorite(id, product_id).await?;
            tracing::info!(user_id = %id, %product_id, "favorite removed");
        }
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn load(&self, id: UserId) -> Result<User, ServiceError> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }

    async fn save(&self, user: &User) -> Result<User, ServiceError> {
        self.store.update_user(user).await.map_err(|e| match e {
            RepositoryError::NotFound => ServiceError::not_found("user", user.id),
            other => map_email_conflict(other),
        })
    }

    async fn ensure_email_free(
        &self,
        email: &Email,
        owner: Option<UserId>,
    ) -> Result<(), ServiceError> {
        match self.store.find_user_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(ValidationErrors::single("email", EMAIL_TAKEN).into())
            }
            _ => Ok(()),
        }
    }
}

/// A unique-email violation that slipped past the pre-check (concurrent
/// registration) is reported like the pre-check would have.
fn map_email_conflict(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::Conflict(_) => ValidationErrors::single("email", EMAIL_TAKEN).into(),
        other => other.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;
    use crate::config::PasswordConfig;
    use crate::db::{MemoryStore, UserRepository};
    use crate::dto::{CategoryRequest, ProductRequest};
    use crate::services::{CategoryService, ProductService};

    struct Fixture {
        store: MemoryStore,
        hasher: CredentialHasher,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: MemoryStore::new(),
                hasher: CredentialHasher::new(&PasswordConfig::for_tests()).unwrap(),
            }
        }

        fn users(&self) -> UserService<'_> {
            UserService::new(&self.store, &self.hasher)
        }

        async fn register(&self, name: &str, email: &str, password: &str) -> UserDto {
            self.users()
                .register(&RegisterUserRequest {
                    name: name.to_owned(),
                    email: email.to_owned(),
                    password: password.to_owned(),
                })
                .await
                .unwrap()
        }

        async fn product(&self) -> ProductDto {
            CategoryService::new(&self.store)
                .create(&CategoryRequest {
                    name: "Livros".to_owned(),
                })
                .await
                .unwrap();
            ProductService::new(&self.store)
                .create(&ProductRequest {
                    name: "Clean Code".to_owned(),
                    description: None,
                    price: Decimal::from_str("80.00").unwrap(),
                    category_id: 1,
                })
                .await
                .unwrap()
        }
    }

    fn address_request(street: &str) -> AddressRequest {
        AddressRequest {
            street: street.to_owned(),
            city: "São Paulo".to_owned(),
            state: "SP".to_owned(),
            zip: "01234-567".to_owned(),
        }
    }

    fn change(old: &str, new: &str) -> ChangePasswordRequest {
        ChangePasswordRequest {
            old_password: old.to_owned(),
            new_password: new.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let fixture = Fixture::new();
        let created = fixture.register("Maria Santos", "maria@test.com", "senha123").await;

        let stored = fixture.store.get_user(created.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "senha123");
        assert!(fixture.hasher.verify("senha123", &stored.password_hash));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let fixture = Fixture::new();
        fixture.register("João", "joao@test.com", "senha123").await;

        let err = fixture
            .users()
            .register(&RegisterUserRequest {
                name: "Outro".to_owned(),
                email: "joao@test.com".to_owned(),
                password: "senha123".to_owned(),
            })
            .await
            .unwrap_err();

        let ServiceError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.get("email"), Some(EMAIL_TAKEN));
    }

    #[tokio::test]
    async fn test_update_keeps_own_email_and_rejects_others() {
        let fixture = Fixture::new();
        let joao = fixture.register("João", "joao@test.com", "senha123").await;
        fixture.register("Ana", "ana@test.com", "senha123").await;

        let same_email = UpdateUserRequest {
            name: "João Silva".to_owned(),
            email: "joao@test.com".to_owned(),
        };
        assert_eq!(
            fixture.users().update(joao.id, &same_email).await.unwrap().name,
            "João Silva"
        );

        let stolen = UpdateUserRequest {
            name: "João".to_owned(),
            email: "ana@test.com".to_owned(),
        };
        assert!(matches!(
            fixture.users().update(joao.id, &stolen).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_change_password_rejects_stale_password() {
        let fixture = Fixture::new();
        let user = fixture.register("João", "joao@test.com", "senha123").await;
        let users = fixture.users();

        users
            .change_password(user.id, &change("senha123", "novaSenha456"))
            .await
            .unwrap();
        assert!(matches!(
            users
                .change_password(user.id, &change("senha123", "outraSenha789"))
                .await,
            Err(ServiceError::Unauthorized)
        ));

        let stored = fixture.store.get_user(user.id).await.unwrap().unwrap();
        assert!(fixture.hasher.verify("novaSenha456", &stored.password_hash));
    }

    #[tokio::test]
    async fn test_change_password_unknown_user() {
        let fixture = Fixture::new();
        assert!(matches!(
            fixture
                .users()
                .change_password(UserId::new(9), &change("senha123", "novaSenha456"))
                .await,
            Err(ServiceError::NotFound { entity: "user", .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_addresses_are_kept() {
        let fixture = Fixture::new();
        let user = fixture.register("João", "joao@test.com", "senha123").await;
        let users = fixture.users();

        users.add_address(user.id, &address_request("Rua A")).await.unwrap();
        users.add_address(user.id, &address_request("Rua A")).await.unwrap();

        assert_eq!(users.addresses(user.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_address_of_other_user_is_not_found() {
        let fixture = Fixture::new();
        let joao = fixture.register("João", "joao@test.com", "senha123").await;
        let ana = fixture.register("Ana", "ana@test.com", "senha123").await;
        let users = fixture.users();
        let address = users
            .add_address(joao.id, &address_request("Rua A"))
            .await
            .unwrap();
        let address_id = address.id.unwrap();

        assert!(matches!(
            users.remove_address(ana.id, address_id).await,
            Err(ServiceError::NotFound { entity: "address", .. })
        ));
        users.remove_address(joao.id, address_id).await.unwrap();
        assert!(users.addresses(joao.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_favorites_are_idempotent() {
        let fixture = Fixture::new();
        let user = fixture.register("João", "joao@test.com", "senha123").await;
        let product = fixture.product().await;
        let users = fixture.users();

        users.add_favorite(user.id, product.id).await.unwrap();
        users.add_favorite(user.id, product.id).await.unwrap();
        assert_eq!(users.favorites(user.id).await.unwrap(), vec![product.clone()]);

        users.remove_favorite(user.id, product.id).await.unwrap();
        users.remove_favorite(user.id, product.id).await.unwrap();
        assert!(users.favorites(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_favorite_unknown_product() {
        let fixture = Fixture::new();
        let user = fixture.register("João", "joao@test.com", "senha123").await;
        assert!(matches!(
            fixture.users().add_favorite(user.id, ProductId::new(5)).await,
            Err(ServiceError::NotFound { entity: "product", .. })
        ));
    }

    #[tokio::test]
    async fn test_list_sorted_by_email() {
        let fixture = Fixture::new();
        fixture.register("João", "joao@test.com", "senha123").await;
        fixture.register("Ana", "ana@test.com", "senha123").await;

        let listed = fixture.users().list(Some("email")).await.unwrap();
        let emails: Vec<&str> = listed.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, ["ana@test.com", "joao@test.com"]);
    }
}
