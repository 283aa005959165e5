use crate::adapters::database::records::RefreshTokenRecord;
use crate::domain::auth::RefreshToken;
use crate::error::Result;
use sqlx::PgConnection;
use time::OffsetDateTime;

#[derive(Clone, Debug, Default)]
pub struct RefreshTokenRepository {}

impl RefreshTokenRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    pub async fn save(&self, conn: &mut PgConnection, token: &RefreshToken) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, created_at, expires_at, used_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.created_at)
        .bind(token.expires_at)
        .bind(token.used_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn get(&self, conn: &mut PgConnection, token_hash: &str) -> Result<Option<RefreshToken>> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT id, user_id, token_hash, created_at, expires_at, used_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// The linearization point for one-time use: a single conditional UPDATE.
    /// Concurrent callers race exactly one write; only the caller whose
    /// `now` comes back in `used_at` owns the consumption, everyone else
    /// observes the earlier value.
    pub async fn mark_used(
        &self,
        conn: &mut PgConnection,
        token_hash: &str,
        now: OffsetDateTime,
    ) -> Result<Option<RefreshToken>> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            UPDATE refresh_tokens SET used_at = COALESCE(used_at, $2)
            WHERE token_hash = $1
            RETURNING id, user_id, token_hash, created_at, expires_at, used_at
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }
}
