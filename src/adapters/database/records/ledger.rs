use crate::domain::ledger::{LedgerTransaction, TransactionKind};
use crate::error::AppError;
use rust_decimal::Decimal;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub(crate) struct TransactionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub kind: String,
    pub amount: Decimal,
    pub processed_at: OffsetDateTime,
}

impl TryFrom<TransactionRecord> for LedgerTransaction {
    type Error = AppError;

    fn try_from(r: TransactionRecord) -> Result<Self, Self::Error> {
        let kind = TransactionKind::parse(&r.kind).ok_or_else(|| {
            tracing::error!(kind = %r.kind, "Unknown transaction kind in store");
            AppError::Internal
        })?;
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            order_number: r.order_number,
            kind,
            amount: r.amount,
            processed_at: r.processed_at,
        })
    }
}
