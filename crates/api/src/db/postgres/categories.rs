use async_trait::async_trait;

use store_core::{Category, CategoryId, ProductId};

use super::{PgStore, map_write_error};
use crate::db::{CategoryRepository, RepositoryError};

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    products: Vec<i64>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            products: row.products.into_iter().map(ProductId::new).collect(),
        }
    }
}

const PRODUCT_IDS: &str =
    "ARRAY(SELECT p.id FROM store.product p WHERE p.category_id = c.id ORDER BY p.id) AS products";

#[async_trait]
impl CategoryRepository for PgStore {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT c.id, c.name, {PRODUCT_IDS} FROM store.category c ORDER BY c.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT c.id, c.name, {PRODUCT_IDS} FROM store.category c WHERE c.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO store.category (name)
            VALUES ($1)
            RETURNING id, name, ARRAY[]::BIGINT[] AS products
            ",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "category"))?;

        tracing::debug!(category_id = %row.id, "category created");
        Ok(row.into())
    }

    async fn update_category(
        &self,
        id: CategoryId,
        name: &str,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE store.category c SET name = $2 WHERE c.id = $1 RETURNING c.id, c.name, {PRODUCT_IDS}"
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM store.category WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "category"))?;

        Ok(result.rows_affected() > 0)
    }
}
