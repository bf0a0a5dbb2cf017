use async_trait::async_trait;

use store_core::{Address, AddressId, UserId};

use super::{PgStore, is_foreign_key_violation};
use crate::db::{AddressRepository, RepositoryError};

pub(super) const ADDRESS_COLUMNS: &str = "id, street, city, state, zip, user_id";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct AddressRow {
    pub(super) id: AddressId,
    pub(super) street: String,
    pub(super) city: String,
    pub(super) state: String,
    pub(super) zip: String,
    pub(super) user_id: UserId,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: Some(row.id),
            street: row.street,
            city: row.city,
            state: row.state,
            zip: row.zip,
            user_id: Some(row.user_id),
        }
    }
}

#[async_trait]
impl AddressRepository for PgStore {
    async fn create_address(&self, address: &Address) -> Result<Address, RepositoryError> {
        let owner = address.user_id.ok_or_else(|| {
            RepositoryError::DataCorruption("address has no owning user".to_owned())
        })?;

        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r"
            INSERT INTO store.address (street, city, state, zip, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip)
        .bind(owner)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                RepositoryError::NotFound
            } else {
                RepositoryError::Database(e)
            }
        })?;

        Ok(row.into())
    }

    async fn delete_address(&self, id: AddressId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM store.address WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
