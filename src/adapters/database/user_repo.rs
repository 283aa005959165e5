use crate::adapters::database::records::UserRecord;
use crate::adapters::database::{UNIQUE_VIOLATION, sqlstate};
use crate::domain::user::User;
use crate::error::{AppError, Result};
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct UserRepository {}

impl UserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Inserts the user row. A duplicate username maps to `UserAlreadyExists`.
    pub async fn create(&self, conn: &mut PgConnection, user: &User) -> Result<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            if sqlstate(&e).as_deref() == Some(UNIQUE_VIOLATION) {
                AppError::UserAlreadyExists
            } else {
                AppError::Store(e)
            }
        })?;

        Ok(record.into())
    }

    pub async fn get_by_id(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    pub async fn get_by_username(&self, conn: &mut PgConnection, username: &str) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }
}
