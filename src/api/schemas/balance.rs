use crate::domain::ledger::LedgerTransaction;
use crate::domain::order::luhn_valid;
use crate::domain::user::Balance;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::{Validate, ValidationError};

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub current: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub withdrawn: Decimal,
}

impl From<Balance> for BalanceResponse {
    fn from(balance: Balance) -> Self {
        Self { current: balance.current, withdrawn: balance.withdrawn }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct WithdrawRequest {
    #[validate(custom(function = "luhn", message = "not a valid order number"))]
    pub order: String,
    #[validate(custom(function = "positive_sum", message = "sum must be positive"))]
    pub sum: Decimal,
}

fn luhn(order: &str) -> Result<(), ValidationError> {
    if luhn_valid(order) { Ok(()) } else { Err(ValidationError::new("luhn")) }
}

fn positive_sum(sum: &Decimal) -> Result<(), ValidationError> {
    if *sum > Decimal::ZERO { Ok(()) } else { Err(ValidationError::new("positive")) }
}

#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    pub order: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub processed_at: OffsetDateTime,
}

impl From<LedgerTransaction> for WithdrawalResponse {
    fn from(transaction: LedgerTransaction) -> Self {
        Self { order: transaction.order_number, sum: transaction.amount, processed_at: transaction.processed_at }
    }
}
