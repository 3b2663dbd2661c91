//! `PostgreSQL` product queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use bakeapi_core::{Price, ProductId, ProductStatus, UserId};

use super::{PgStore, ProductStore, RepositoryError};
use crate::models::{NewProduct, Product, ProductChanges};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: Price,
    status: ProductStatus,
    user_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            status: row.status,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, status, user_id, created_at, updated_at
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, status, user_id, created_at, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Product>, RepositoryError> {
        let exists: bool = sqlx::query_scalar(r"SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(owner)
            .fetch_one(self.pool())
            .await?;

        if !exists {
            return Err(RepositoryError::OwnerNotFound(owner));
        }

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, status, user_id, created_at, updated_at
            FROM products
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(owner)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(
        &self,
        owner: UserId,
        product: &NewProduct,
        created_at: DateTime<Utc>,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (name, price, status, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, name, price, status, user_id, created_at, updated_at
            ",
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(product.status)
        .bind(owner)
        .bind(created_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::OwnerNotFound(owner);
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET name = COALESCE($2, name),
                price = COALESCE($3, price),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, price, status, user_id, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.price)
        .bind(changes.status)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(r"DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_discount_eligible(
        &self,
        owner: UserId,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, status, user_id, created_at, updated_at
            FROM products
            WHERE user_id = $1 AND status = $2 AND created_at <= $3
            ORDER BY id
            ",
        )
        .bind(owner)
        .bind(ProductStatus::OnSale)
        .bind(cutoff)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn mark_unsold(&self, id: ProductId, price: Price) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET price = $2, status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $4
            ",
        )
        .bind(id)
        .bind(price)
        .bind(ProductStatus::Unsold)
        .bind(ProductStatus::OnSale)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }
}

impl PgStore {
    /// Remove every product and user. Used by the fixture loader.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the truncate fails.
    pub async fn clear(&self) -> Result<(), RepositoryError> {
        sqlx::query(r"TRUNCATE products, users RESTART IDENTITY CASCADE")
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
