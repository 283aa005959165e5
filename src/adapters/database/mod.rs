use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use time::OffsetDateTime;

pub mod balance_repo;
pub mod order_repo;
pub(crate) mod records;
pub mod refresh_token_repo;
pub mod transaction_repo;
pub mod user_repo;

pub type DbPool = Pool<Postgres>;

pub(crate) const UNIQUE_VIOLATION: &str = "23505";
pub(crate) const FOREIGN_KEY_VIOLATION: &str = "23503";
pub(crate) const CHECK_VIOLATION: &str = "23514";

/// Initializes the database connection pool.
///
/// # Errors
/// Returns `sqlx::Error` if the connection fails.
pub async fn init_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new().max_connections(20).connect(database_url).await
}

/// SQLSTATE of a database error, if any.
pub(crate) fn sqlstate(err: &sqlx::Error) -> Option<String> {
    err.as_database_error().and_then(|e| e.code()).map(|code| code.into_owned())
}

/// Current UTC instant truncated to microseconds, so a bound timestamp
/// round-trips through a `timestamptz` column unchanged.
pub(crate) fn pg_now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(now.nanosecond() / 1_000 * 1_000).unwrap_or(now)
}
