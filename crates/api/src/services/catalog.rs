//! Product and category request handling.

use store_core::{
    CategoryId, NewProduct, ProductId, ProductWithCategory, apply_product_update,
    relationships::{assign_category, detach_product},
};

use super::ServiceError;
use crate::db::{RepositoryError, Store};
use crate::dto::{CategoryDto, CategoryRequest, ProductDto, ProductRequest};

const INVALID_CATEGORY: &str = "Category does not exist.";

/// Product operations.
pub struct ProductService<'a> {
    store: &'a dyn Store,
}

impl<'a> ProductService<'a> {
    /// Create a new product service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// List products, optionally restricted to one category.
    ///
    /// A filter outside the category id range cannot match anything, so it
    /// yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list(&self, category_id: Option<i64>) -> Result<Vec<ProductDto>, ServiceError> {
        let joined = match category_id {
            None => self.store.list_products_with_category().await?,
            Some(raw) => match CategoryId::try_from(raw) {
                Ok(id) => self.store.list_products_by_category(id).await?,
                Err(_) => Vec::new(),
            },
        };
        Ok(joined.iter().map(ProductDto::from).collect())
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist.
    pub async fn get(&self, id: ProductId) -> Result<ProductDto, ServiceError> {
        self.store
            .get_product_with_category(id)
            .await?
            .map(|joined| ProductDto::from(&joined))
            .ok_or_else(|| ServiceError::not_found("product", id))
    }

    /// Create a product in an existing category.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for malformed fields and
    /// `ServiceError::InvalidReference` if the category does not resolve.
    /// Nothing is written in either case.
    pub async fn create(&self, request: &ProductRequest) -> Result<ProductDto, ServiceError> {
        let changes = request.validate()?;
        let mut category = self.resolve_category(request.category_id).await?;

        let input = NewProduct {
            name: changes.name,
            description: changes.description,
            price: changes.price,
            category_id: category.id,
        };
        let mut product = self
            .store
            .create_product(&input)
            .await
            .map_err(|e| map_category_race(e, category.id))?;
        assign_category(&mut category, &mut product);

        tracing::info!(product_id = %product.id, category_id = %category.id, "product created");
        Ok(ProductDto::from(&ProductWithCategory { product, category }))
    }

    /// Replace a product's name, description, price and category.
    ///
    /// The product is resolved first (404), then the category (400).
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound`, `ServiceError::InvalidReference` or
    /// `ServiceError::Validation`; the stored product is unchanged on error.
    pub async fn update(
        &self,
        id: ProductId,
        request: &ProductRequest,
    ) -> Result<ProductDto, ServiceError> {
        let changes = request.validate()?;
        let mut product = self
            .store
            .get_product(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", id))?;
        let mut category = self.resolve_category(request.category_id).await?;

        let previous = product.category_id;
        apply_product_update(&mut product, changes);
        if previous != category.id {
            if let Some(mut old) = self.store.get_category(previous).await? {
                detach_product(&mut old, id);
                tracing::debug!(
                    product_id = %id,
                    category_id = %previous,
                    remaining = old.products.len(),
                    "product detached from category"
                );
            }
        }
        assign_category(&mut category, &mut product);

        let product = self
            .store
            .update_product(&product)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::not_found("product", id),
                other => map_category_race(other, category.id),
            })?;

        tracing::info!(product_id = %product.id, category_id = %category.id, "product updated");
        Ok(ProductDto::from(&ProductWithCategory { product, category }))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), ServiceError> {
        if !self.store.delete_product(id).await? {
            return Err(ServiceError::not_found("product", id));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    async fn resolve_category(&self, raw: i64) -> Result<store_core::Category, ServiceError> {
        let invalid = || ServiceError::InvalidReference {
            field: "categoryId",
            message: INVALID_CATEGORY.to_owned(),
        };
        let id = CategoryId::try_from(raw).map_err(|_| invalid())?;
        self.store.get_category(id).await?.ok_or_else(invalid)
    }
}

/// A category deleted between resolution and the write surfaces as a
/// foreign-key conflict; report it the same way as an unknown category.
fn map_category_race(err: RepositoryError, category_id: CategoryId) -> ServiceError {
    match err {
        RepositoryError::Conflict(_) => {
            tracing::warn!(%category_id, "category disappeared before product write");
            ServiceError::InvalidReference {
                field: "categoryId",
                message: INVALID_CATEGORY.to_owned(),
            }
        }
        other => ServiceError::Repository(other),
    }
}

/// Category operations.
pub struct CategoryService<'a> {
    store: &'a dyn Store,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<CategoryDto>, ServiceError> {
        let categories = self.store.list_categories().await?;
        Ok(categories.iter().map(CategoryDto::from).collect())
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the id is out of range or unknown.
    pub async fn get(&self, raw_id: i64) -> Result<CategoryDto, ServiceError> {
        let id = parse_category_id(raw_id)?;
        self.store
            .get_category(id)
            .await?
            .map(|category| CategoryDto::from(&category))
            .ok_or_else(|| ServiceError::not_found("category", raw_id))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank name and
    /// `ServiceError::Conflict` once every category id is taken.
    pub async fn create(&self, request: &CategoryRequest) -> Result<CategoryDto, ServiceError> {
        let name = request.validate()?;
        let category = self.store.create_category(&name).await.map_err(|e| match e {
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            other => ServiceError::Repository(other),
        })?;

        tracing::info!(category_id = %category.id, "category created");
        Ok(CategoryDto::from(&category))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` or `ServiceError::Validation`.
    pub async fn update(
        &self,
        raw_id: i64,
        request: &CategoryRequest,
    ) -> Result<CategoryDto, ServiceError> {
        let name = request.validate()?;
        let id = parse_category_id(raw_id)?;
        let category = self
            .store
            .update_category(id, &name)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::not_found("category", raw_id),
                other => ServiceError::Repository(other),
            })?;
        Ok(CategoryDto::from(&category))
    }

    /// Delete an empty category.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if it does not exist and
    /// `ServiceError::Conflict` while products still belong to it.
    pub async fn delete(&self, raw_id: i64) -> Result<(), ServiceError> {
        let id = parse_category_id(raw_id)?;
        let category = self
            .store
            .get_category(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("category", raw_id))?;
        if !category.products.is_empty() {
            return Err(ServiceError::Conflict(format!(
                "Category {id} still has {} product(s).",
                category.products.len()
            )));
        }

        match self.store.delete_category(id).await {
            Ok(true) => {}
            Ok(false) => return Err(ServiceError::not_found("category", raw_id)),
            Err(RepositoryError::Conflict(message)) => return Err(ServiceError::Conflict(message)),
            Err(other) => return Err(other.into()),
        }
        tracing::info!(category_id = %id, "category deleted");
        Ok(())
    }
}

fn parse_category_id(raw: i64) -> Result<CategoryId, ServiceError> {
    CategoryId::try_from(raw).map_err(|_| ServiceError::not_found("category", raw))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;
    use crate::db::{CategoryRepository, MemoryStore, ProductRepository};

    fn request(name: &str, price: &str, category_id: i64) -> ProductRequest {
        ProductRequest {
            name: name.to_owned(),
            description: None,
            price: Decimal::from_str(price).unwrap(),
            category_id,
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        let categories = CategoryService::new(&store);
        for name in ["Eletrônicos", "Livros"] {
            categories
                .create(&CategoryRequest {
                    name: name.to_owned(),
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_create_with_unknown_category_writes_nothing() {
        let store = seeded().await;
        let products = ProductService::new(&store);

        let err = products
            .create(&request("Mouse", "150.00", 99))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidReference { field: "categoryId", .. }));
        assert!(store.list_products_with_category().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_attaches_category() {
        let store = seeded().await;
        let products = ProductService::new(&store);

        let created = products
            .create(&request("Mouse Logitech", "150.00", 1))
            .await
            .unwrap();

        assert_eq!(created.category.name, "Eletrônicos");
        assert_eq!(created.price.to_string(), "150.00");
        let category = store.get_category(CategoryId::new(1)).await.unwrap().unwrap();
        assert!(category.contains(created.id));
    }

    #[tokio::test]
    async fn test_update_with_unknown_category_keeps_row() {
        let store = seeded().await;
        let products = ProductService::new(&store);
        let created = products
            .create(&request("Notebook Dell", "2500.00", 1))
            .await
            .unwrap();

        let err = products
            .update(created.id, &request("Notebook Dell XPS", "3000.00", 42))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidReference { .. }));
        assert_eq!(products.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_update_missing_product_is_checked_first() {
        let store = seeded().await;
        let products = ProductService::new(&store);

        let err = products
            .update(ProductId::new(77), &request("Ghost", "1.00", 200))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound { entity: "product", .. }));
    }

    #[tokio::test]
    async fn test_update_moves_product_between_categories() {
        let store = seeded().await;
        let products = ProductService::new(&store);
        let created = products
            .create(&request("Clean Code", "80.00", 1))
            .await
            .unwrap();

        let updated = products
            .update(created.id, &request("Clean Code", "89.90", 2))
            .await
            .unwrap();

        assert_eq!(updated.category_id, CategoryId::new(2));
        assert_eq!(updated.price.to_string(), "89.90");
        assert!(products.list(Some(1)).await.unwrap().is_empty());
        assert_eq!(products.list(Some(2)).await.unwrap().len(), 1);

        let categories = CategoryService::new(&store);
        categories.delete(1).await.unwrap();
        assert!(matches!(
            categories.delete(2).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_filter_out_of_range_is_empty() {
        let store = seeded().await;
        let products = ProductService::new(&store);
        products.create(&request("Mouse", "1.00", 1)).await.unwrap();

        assert!(products.list(Some(4096)).await.unwrap().is_empty());
        assert_eq!(products.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let store = seeded().await;
        let products = ProductService::new(&store);
        let created = products.create(&request("Mouse", "1.00", 1)).await.unwrap();

        products.delete(created.id).await.unwrap();

        assert!(matches!(
            products.get(created.id).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            products.delete(created.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_category_in_use_cannot_be_deleted() {
        let store = seeded().await;
        let categories = CategoryService::new(&store);
        ProductService::new(&store)
            .create(&request("Mouse", "1.00", 1))
            .await
            .unwrap();

        assert!(matches!(
            categories.delete(1).await,
            Err(ServiceError::Conflict(_))
        ));
        categories.delete(2).await.unwrap();
        assert!(matches!(
            categories.get(2).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_category_rename() {
        let store = seeded().await;
        let categories = CategoryService::new(&store);

        let renamed = categories
            .update(
                2,
                &CategoryRequest {
                    name: "Livros técnicos".to_owned(),
                },
            )
            .await
            .unwrap();

        assert_eq!(renamed.name, "Livros técnicos");
        assert!(matches!(
            categories.update(300, &CategoryRequest { name: "x".to_owned() }).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}
