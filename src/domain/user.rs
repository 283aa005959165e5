use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Materialized aggregate over the user's ledger. `current` is the signed sum
/// of transactions, `withdrawn` the sum of withdrawal amounts; both are kept
/// non-negative by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub user_id: Uuid,
    pub current: Decimal,
    pub withdrawn: Decimal,
}
