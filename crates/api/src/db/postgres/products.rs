use async_trait::async_trait;
use rust_decimal::Decimal;

use store_core::{
    Category, CategoryId, NewProduct, Price, Product, ProductId, ProductWithCategory,
};

use super::{PgStore, map_write_error};
use crate::db::{ProductRepository, RepositoryError};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: Option<String>,
    price: Decimal,
    category_id: CategoryId,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price,
            category_id: row.category_id,
        })
    }
}

/// Product joined with its category and the category's product ids.
#[derive(Debug, sqlx::FromRow)]
struct ProductWithCategoryRow {
    #[sqlx(flatten)]
    product: ProductRow,
    category_name: String,
    category_products: Vec<i64>,
}

impl TryFrom<ProductWithCategoryRow> for ProductWithCategory {
    type Error = RepositoryError;

    fn try_from(row: ProductWithCategoryRow) -> Result<Self, Self::Error> {
        let product = Product::try_from(row.product)?;
        let mut category = Category::new(product.category_id, row.category_name);
        category.products = row
            .category_products
            .into_iter()
            .map(ProductId::new)
            .collect();

        Ok(Self { product, category })
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, category_id";

const JOINED_SELECT: &str = r"
    SELECT p.id, p.name, p.description, p.price, p.category_id,
           c.name AS category_name,
           ARRAY(
               SELECT sibling.id FROM store.product sibling
               WHERE sibling.category_id = c.id
               ORDER BY sibling.id
           ) AS category_products
    FROM store.product p
    JOIN store.category c ON c.id = p.category_id
";

fn convert_joined(
    rows: Vec<ProductWithCategoryRow>,
) -> Result<Vec<ProductWithCategory>, RepositoryError> {
    rows.into_iter().map(ProductWithCategory::try_from).collect()
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn list_products_with_category(
        &self,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductWithCategoryRow>(&format!(
            "{JOINED_SELECT} ORDER BY p.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        convert_joined(rows)
    }

    async fn list_products_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductWithCategoryRow>(&format!(
            "{JOINED_SELECT} WHERE p.category_id = $1 ORDER BY p.id"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        convert_joined(rows)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Product::try_from)
        .transpose()
    }

    async fn get_product_with_category(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductWithCategory>, RepositoryError> {
        sqlx::query_as::<_, ProductWithCategoryRow>(&format!("{JOINED_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(ProductWithCategory::try_from)
            .transpose()
    }

    async fn create_product(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO store.product (name, description, price, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.price.amount())
        .bind(input.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "product"))?;

        tracing::debug!(product_id = %row.id, "product created");
        row.try_into()
    }

    async fn update_product(&self, product: &Product) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE store.product
            SET name = $2, description = $3, price = $4, category_id = $5
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(product.price.amount())
        .bind(product.category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "product"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        // favorite_product rows cascade.
        let result = sqlx::query("DELETE FROM store.product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
