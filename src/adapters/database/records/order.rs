use crate::domain::order::{Order, OrderStatus};
use crate::error::AppError;
use rust_decimal::Decimal;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub(crate) struct OrderRecord {
    pub id: Uuid,
    pub number: String,
    pub user_id: Uuid,
    pub status: String,
    pub accrual: Option<Decimal>,
    pub uploaded_at: OffsetDateTime,
    pub modified_at: OffsetDateTime,
}

impl TryFrom<OrderRecord> for Order {
    type Error = AppError;

    fn try_from(r: OrderRecord) -> Result<Self, Self::Error> {
        let status = OrderStatus::parse(&r.status).ok_or_else(|| {
            tracing::error!(status = %r.status, number = %r.number, "Unknown order status in store");
            AppError::Internal
        })?;
        Ok(Self {
            id: r.id,
            number: r.number,
            user_id: r.user_id,
            status,
            accrual: r.accrual,
            uploaded_at: r.uploaded_at,
            modified_at: r.modified_at,
        })
    }
}
