//! In-memory store used by tests and `STORE_BACKEND=memory`.
//!
//! Rows live in ordered maps behind a single `std::sync::RwLock`. The lock is
//! never held across an `.await`; each trait call takes it once, so every
//! call is atomic but sequences of calls are not.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use store_core::{
    Address, AddressId, Category, CategoryId, Email, NewProduct, NewUser, Product, ProductId,
    ProductWithCategory, User, UserId,
};

use super::{
    AddressRepository, CategoryRepository, ProductRepository, RepositoryError, Store,
    UserRepository, UserSort,
};

/// Highest id a category can take.
const MAX_CATEGORY_ID: u16 = 255;

#[derive(Debug, Clone)]
struct UserRecord {
    name: String,
    email: Email,
    password_hash: String,
}

#[derive(Debug)]
struct Tables {
    categories: BTreeMap<CategoryId, String>,
    products: BTreeMap<ProductId, Product>,
    users: BTreeMap<UserId, UserRecord>,
    addresses: BTreeMap<AddressId, Address>,
    favorites: BTreeSet<(UserId, ProductId)>,
    next_category: u16,
    next_product: i64,
    next_user: i64,
    next_address: i64,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            categories: BTreeMap::new(),
            products: BTreeMap::new(),
            users: BTreeMap::new(),
            addresses: BTreeMap::new(),
            favorites: BTreeSet::new(),
            next_category: 1,
            next_product: 1,
            next_user: 1,
            next_address: 1,
        }
    }
}

impl Tables {
    fn category(&self, id: CategoryId) -> Option<Category> {
        let name = self.categories.get(&id)?;
        let mut category = Category::new(id, name.clone());
        category.products = self
            .products
            .values()
            .filter(|product| product.category_id == id)
            .map(|product| product.id)
            .collect();
        Some(category)
    }

    fn joined(&self, product: &Product) -> Result<ProductWithCategory, RepositoryError> {
        let category = self.category(product.category_id).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "product {} references missing category {}",
                product.id, product.category_id
            ))
        })?;
        Ok(ProductWithCategory {
            product: product.clone(),
            category,
        })
    }

    fn user(&self, id: UserId) -> Option<User> {
        let record = self.users.get(&id)?;
        Some(User {
            id,
            name: record.name.clone(),
            email: record.email.clone(),
            password_hash: record.password_hash.clone(),
            addresses: self
                .addresses
                .values()
                .filter(|address| address.user_id == Some(id))
                .cloned()
                .collect(),
            favorite_products: self
                .favorites
                .range((id, ProductId::new(i64::MIN))..=(id, ProductId::new(i64::MAX)))
                .map(|(_, product_id)| *product_id)
                .collect(),
        })
    }

    fn email_taken(&self, email: &Email, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|(id, record)| record.email == *email && Some(*id) != except)
    }
}

/// Store backed by process memory. Cloning is not supported; share it behind
/// an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, RepositoryError> {
        self.tables.read().map_err(|_| RepositoryError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, RepositoryError> {
        self.tables.write().map_err(|_| RepositoryError::Poisoned)
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let tables = self.read()?;
        Ok(tables
            .categories
            .keys()
            .filter_map(|id| tables.category(*id))
            .collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        Ok(self.read()?.category(id))
    }

    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let mut tables = self.write()?;
        while tables.next_category <= MAX_CATEGORY_ID {
            let candidate = u8::try_from(tables.next_category)
                .map(CategoryId::new)
                .map_err(|_| RepositoryError::Conflict("category ids exhausted".to_owned()))?;
            tables.next_category += 1;
            if !tables.categories.contains_key(&candidate) {
                tables.categories.insert(candidate, name.to_owned());
                return Ok(Category::new(candidate, name));
            }
        }
        Err(RepositoryError::Conflict("category ids exhausted".to_owned()))
    }

    async fn update_category(
        &self,
        id: CategoryId,
        name: &str,
    ) -> Result<Category, RepositoryError> {
        let mut tables = self.write()?;
        let stored = tables
            .categories
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        name.clone_into(stored);
        tables.category(id).ok_or(RepositoryError::NotFound)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let mut tables = self.write()?;
        if tables
            .products
            .values()
            .any(|product| product.category_id == id)
        {
            return Err(RepositoryError::Conflict(format!(
                "category {id} still has products"
            )));
        }
        Ok(tables.categories.remove(&id).is_some())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list_products_with_category(
        &self,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError> {
        let tables = self.read()?;
        tables
            .products
            .values()
            .map(|product| tables.joined(product))
            .collect()
    }

    async fn list_products_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError> {
        let tables = self.read()?;
        tables
            .products
            .values()
            .filter(|product| product.category_id == category_id)
            .map(|product| tables.joined(product))
            .collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn get_product_with_category(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductWithCategory>, RepositoryError> {
        let tables = self.read()?;
        tables
            .products
            .get(&id)
            .map(|product| tables.joined(product))
            .transpose()
    }

    async fn create_product(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let mut tables = self.write()?;
        if !tables.categories.contains_key(&input.category_id) {
            return Err(RepositoryError::Conflict(format!(
                "category {} does not exist",
                input.category_id
            )));
        }
        let id = ProductId::new(tables.next_product);
        tables.next_product += 1;
        let product = Product {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            category_id: input.category_id,
        };
        tables.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> Result<Product, RepositoryError> {
        let mut tables = self.write()?;
        if !tables.categories.contains_key(&product.category_id) {
            return Err(RepositoryError::Conflict(format!(
                "category {} does not exist",
                product.category_id
            )));
        }
        let stored = tables
            .products
            .get_mut(&product.id)
            .ok_or(RepositoryError::NotFound)?;
        stored.clone_from(product);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut tables = self.write()?;
        if tables.products.remove(&id).is_none() {
            return Ok(false);
        }
        tables.favorites.retain(|(_, product_id)| *product_id != id);
        Ok(true)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list_users(&self, sort: UserSort) -> Result<Vec<User>, RepositoryError> {
        let tables = self.read()?;
        let mut users: Vec<User> = tables
            .users
            .keys()
            .filter_map(|id| tables.user(*id))
            .collect();
        match sort {
            UserSort::Name => users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id))),
            UserSort::Email => users.sort_by(|a, b| a.email.cmp(&b.email).then(a.id.cmp(&b.id))),
        }
        Ok(users)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.read()?.user(id))
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let tables = self.read()?;
        Ok(tables
            .users
            .iter()
            .find(|(_, record)| record.email == *email)
            .and_then(|(id, _)| tables.user(*id)))
    }

    async fn create_user(&self, input: &NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.write()?;
        if tables.email_taken(&input.email, None) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let id = UserId::new(tables.next_user);
        tables.next_user += 1;
        tables.users.insert(
            id,
            UserRecord {
                name: input.name.clone(),
                email: input.email.clone(),
                password_hash: input.password_hash.clone(),
            },
        );
        Ok(User::new(id, input.clone()))
    }

    async fn update_user(&self, user: &User) -> Result<User, RepositoryError> {
        let mut tables = self.write()?;
        if tables.email_taken(&user.email, Some(user.id)) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let record = tables
            .users
            .get_mut(&user.id)
            .ok_or(RepositoryError::NotFound)?;
        record.name.clone_from(&user.name);
        record.email = user.email.clone();
        record.password_hash.clone_from(&user.password_hash);
        tables.user(user.id).ok_or(RepositoryError::NotFound)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        let mut tables = self.write()?;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables
            .addresses
            .retain(|_, address| address.user_id != Some(id));
        tables.favorites.retain(|(user_id, _)| *user_id != id);
        Ok(true)
    }

    async fn add_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user_id) || !tables.products.contains_key(&product_id) {
            return Err(RepositoryError::NotFound);
        }
        tables.favorites.insert((user_id, product_id));
        Ok(())
    }

    async fn remove_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        Ok(self.write()?.favorites.remove(&(user_id, product_id)))
    }
}

#[async_trait]
impl AddressRepository for MemoryStore {
    async fn create_address(&self, address: &Address) -> Result<Address, RepositoryError> {
        let mut tables = self.write()?;
        let owner = address.user_id.ok_or_else(|| {
            RepositoryError::DataCorruption("address has no owning user".to_owned())
        })?;
        if !tables.users.contains_key(&owner) {
            return Err(RepositoryError::NotFound);
        }
        let id = AddressId::new(tables.next_address);
        tables.next_address += 1;
        let mut stored = address.clone();
        stored.id = Some(id);
        tables.addresses.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete_address(&self, id: AddressId) -> Result<bool, RepositoryError> {
        Ok(self.write()?.addresses.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use store_core::{NewAddress, Price};

    use super::*;

    fn new_product(name: &str, category_id: CategoryId) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            description: None,
            price: Price::new(Decimal::new(2_500, 2)).unwrap(),
            category_id,
        }
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_owned(),
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_category_ids_start_at_one() {
        let store = MemoryStore::new();
        let first = store.create_category("Eletrônicos").await.unwrap();
        let second = store.create_category("Livros").await.unwrap();
        assert_eq!(first.id, CategoryId::new(1));
        assert_eq!(second.id, CategoryId::new(2));
    }

    #[tokio::test]
    async fn test_category_ids_exhaust_at_255() {
        let store = MemoryStore::new();
        for _ in 1..=255 {
            store.create_category("c").await.unwrap();
        }
        assert!(matches!(
            store.create_category("overflow").await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_products_are_listed_by_category() {
        let store = MemoryStore::new();
        let eletronicos = store.create_category("Eletrônicos").await.unwrap();
        let livros = store.create_category("Livros").await.unwrap();
        store
            .create_product(&new_product("Notebook", eletronicos.id))
            .await
            .unwrap();
        store
            .create_product(&new_product("Livro", livros.id))
            .await
            .unwrap();

        let all = store.list_products_with_category().await.unwrap();
        let only_books = store.list_products_by_category(livros.id).await.unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(only_books.len(), 1);
        assert_eq!(only_books[0].category.name, "Livros");
        assert_eq!(
            store.get_category(livros.id).await.unwrap().unwrap().products,
            vec![only_books[0].product.id]
        );
    }

    #[tokio::test]
    async fn test_category_with_products_cannot_be_deleted() {
        let store = MemoryStore::new();
        let category = store.create_category("Livros").await.unwrap();
        let product = store
            .create_product(&new_product("Livro", category.id))
            .await
            .unwrap();

        assert!(matches!(
            store.delete_category(category.id).await,
            Err(RepositoryError::Conflict(_))
        ));

        assert!(store.delete_product(product.id).await.unwrap());
        assert!(store.delete_category(category.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store
            .create_user(&new_user("João", "joao@test.com"))
            .await
            .unwrap();
        assert!(matches!(
            store.create_user(&new_user("Outro", "joao@test.com")).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_list_users_sorted() {
        let store = MemoryStore::new();
        store
            .create_user(&new_user("Zé", "a@test.com"))
            .await
            .unwrap();
        store
            .create_user(&new_user("Ana", "z@test.com"))
            .await
            .unwrap();

        let by_name = store.list_users(UserSort::Name).await.unwrap();
        let by_email = store.list_users(UserSort::Email).await.unwrap();

        assert_eq!(by_name[0].name, "Ana");
        assert_eq!(by_email[0].name, "Zé");
    }

    #[tokio::test]
    async fn test_delete_user_drops_addresses_and_favorites() {
        let store = MemoryStore::new();
        let category = store.create_category("Livros").await.unwrap();
        let product = store
            .create_product(&new_product("Livro", category.id))
            .await
            .unwrap();
        let user = store
            .create_user(&new_user("João", "joao@test.com"))
            .await
            .unwrap();

        let mut address = Address::detached(NewAddress {
            street: "Rua A".to_owned(),
            city: "São Paulo".to_owned(),
            state: "SP".to_owned(),
            zip: "01234-567".to_owned(),
        });
        address.user_id = Some(user.id);
        store.create_address(&address).await.unwrap();
        store.add_favorite(user.id, product.id).await.unwrap();

        let loaded = store.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(loaded.addresses.len(), 1);
        assert!(loaded.favorite_products.contains(&product.id));

        assert!(store.delete_user(user.id).await.unwrap());
        let tables = store.read().unwrap();
        assert!(tables.addresses.is_empty());
        assert!(tables.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_delete_product_drops_favorites() {
        let store = MemoryStore::new();
        let category = store.create_category("Livros").await.unwrap();
        let product = store
            .create_product(&new_product("Livro", category.id))
            .await
            .unwrap();
        let user = store
            .create_user(&new_user("João", "joao@test.com"))
            .await
            .unwrap();
        store.add_favorite(user.id, product.id).await.unwrap();

        store.delete_product(product.id).await.unwrap();

        let loaded = store.get_user(user.id).await.unwrap().unwrap();
        assert!(loaded.favorite_products.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let store = MemoryStore::new();
        let category = store.create_category("Livros").await.unwrap();
        let mut product = store
            .create_product(&new_product("Livro", category.id))
            .await
            .unwrap();
        product.id = ProductId::new(999);
        assert!(matches!(
            store.update_product(&product).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
