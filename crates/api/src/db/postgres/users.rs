use std::collections::BTreeMap;

use async_trait::async_trait;

use store_core::{Address, Email, NewUser, ProductId, User, UserId};

use super::addresses::{ADDRESS_COLUMNS, AddressRow};
use super::{PgStore, is_foreign_key_violation, map_write_error};
use crate::db::{RepositoryError, UserRepository, UserSort};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    password: String,
    favorites: Vec<i64>,
}

impl UserRow {
    fn into_user(self, addresses: Vec<Address>) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(User {
            id: self.id,
            name: self.name,
            email,
            password_hash: self.password,
            addresses,
            favorite_products: self.favorites.into_iter().map(ProductId::new).collect(),
        })
    }
}

const USER_SELECT: &str = r"
    SELECT u.id, u.name, u.email, u.password,
           ARRAY(
               SELECT f.product_id FROM store.favorite_product f
               WHERE f.user_id = u.id
               ORDER BY f.product_id
           ) AS favorites
    FROM store.app_user u
";

impl PgStore {
    /// Load addresses for the given users, grouped by owner.
    async fn addresses_by_user(
        &self,
        user_ids: &[i64],
    ) -> Result<BTreeMap<UserId, Vec<Address>>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM store.address WHERE user_id = ANY($1) ORDER BY id"
        ))
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: BTreeMap<UserId, Vec<Address>> = BTreeMap::new();
        for row in rows {
            let owner = row.user_id;
            grouped.entry(owner).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn hydrate(&self, rows: Vec<UserRow>) -> Result<Vec<User>, RepositoryError> {
        let ids: Vec<i64> = rows.iter().map(|row| row.id.as_i64()).collect();
        let mut addresses = self.addresses_by_user(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let owned = addresses.remove(&row.id).unwrap_or_default();
                row.into_user(owned)
            })
            .collect()
    }

    async fn hydrate_one(&self, row: Option<UserRow>) -> Result<Option<User>, RepositoryError> {
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn list_users(&self, sort: UserSort) -> Result<Vec<User>, RepositoryError> {
        let order = match sort {
            UserSort::Name => "u.name, u.id",
            UserSort::Email => "u.email, u.id",
        };
        let rows = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} ORDER BY {order}"))
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        self.hydrate_one(row).await
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE u.email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        self.hydrate_one(row).await
    }

    async fn create_user(&self, input: &NewUser) -> Result<User, RepositoryError> {
        let id: UserId = sqlx::query_scalar(
            r"
            INSERT INTO store.app_user (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(input.email.as_str())
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "email"))?;

        tracing::debug!(user_id = %id, "user created");
        Ok(User::new(id, input.clone()))
    }

    async fn update_user(&self, user: &User) -> Result<User, RepositoryError> {
        let updated: Option<UserId> = sqlx::query_scalar(
            r"
            UPDATE store.app_user
            SET name = $2, email = $3, password = $4
            WHERE id = $1
            RETURNING id
            ",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "email"))?;

        let id = updated.ok_or(RepositoryError::NotFound)?;
        self.get_user(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        // address and favorite_product rows cascade.
        let result = sqlx::query("DELETE FROM store.app_user WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO store.favorite_product (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                RepositoryError::NotFound
            } else {
                RepositoryError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn remove_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM store.favorite_product WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
