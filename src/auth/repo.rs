use anyhow::Context;
use sqlx::PgPool;

use crate::auth::repo_types::User;

const COLUMNS: &str = "id, email, password_hash, created_at";

impl User {
    /// `email` is expected lower-cased already.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(db)
            .await
            .context("find user by email")
    }

    /// `None` when the unique email index already holds this address.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
             ON CONFLICT (email) DO NOTHING RETURNING {COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .fetch_optional(db)
        .await
        .context("insert user")
    }
}
