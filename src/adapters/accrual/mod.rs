use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub mod http;

pub use http::HttpAccrualClient;

/// Scoring verdict for one order, as reported by the external service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccrualStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderAccrual {
    pub order: String,
    pub status: AccrualStatus,
    #[serde(default)]
    pub accrual: Option<Decimal>,
}

#[derive(Debug, Error)]
pub enum AccrualError {
    /// The order is not registered upstream at all.
    #[error("order is not registered in the accrual system")]
    NoContent,
    /// The service is shedding load; no further requests until the window passes.
    #[error("accrual system asked to retry after {retry_after:?}")]
    RetryAfter { retry_after: Duration },
    #[error("accrual request failed: {0}")]
    Unknown(anyhow::Error),
}

/// Seam to the external scoring service; the HTTP client is the production
/// implementation, tests substitute scripted fakes.
#[async_trait]
pub trait AccrualProvider: Send + Sync + std::fmt::Debug {
    async fn get_order_accrual(&self, number: &str) -> Result<OrderAccrual, AccrualError>;
}
