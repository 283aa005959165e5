use crate::domain::order::{Order, OrderStatus};
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

/// Wire form of an order: uppercase status, RFC 3339 timestamp, accrual as a
/// JSON number omitted while unset.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub number: String,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub accrual: Option<Decimal>,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            number: order.number,
            status: order.status,
            accrual: order.accrual,
            uploaded_at: order.uploaded_at,
        }
    }
}
