//! `PostgreSQL` user queries.

use async_trait::async_trait;

use bakeapi_core::{Email, UserId};

use super::{PgStore, RepositoryError, UserStore};
use crate::models::User;

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: Email,
    bakery_name: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            bakery_name: row.bakery_name,
        }
    }
}

/// Internal row type for credential lookups.
#[derive(Debug, sqlx::FromRow)]
struct UserCredentialRow {
    id: UserId,
    email: Email,
    bakery_name: Option<String>,
    password_hash: String,
}

#[async_trait]
impl UserStore for PgStore {
    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserCredentialRow>(
            r"
            SELECT id, email, bakery_name, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|r| {
            let user = User {
                id: r.id,
                email: r.email,
                bakery_name: r.bakery_name,
            };
            (user, r.password_hash)
        }))
    }

    async fn create_user(
        &self,
        email: &Email,
        password_hash: &str,
        bakery_name: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (email, password_hash, bakery_name)
            VALUES ($1, $2, $3)
            RETURNING id, email, bakery_name
            ",
        )
        .bind(email)
        .bind(password_hash)
        .bind(bakery_name)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("email {email} already exists"));
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }
}
