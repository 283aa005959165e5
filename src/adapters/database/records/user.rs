use crate::domain::user::{Balance, User};
use rust_decimal::Decimal;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub(crate) struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self { id: r.id, username: r.username, password_hash: r.password_hash, created_at: r.created_at }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct BalanceRecord {
    pub user_id: Uuid,
    pub current: Decimal,
    pub withdrawn: Decimal,
}

impl From<BalanceRecord> for Balance {
    fn from(r: BalanceRecord) -> Self {
        Self { user_id: r.user_id, current: r.current, withdrawn: r.withdrawn }
    }
}
