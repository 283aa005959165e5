use crate::adapters::accrual::{AccrualError, AccrualProvider, OrderAccrual};
use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;

const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Stateless client for `GET {addr}/api/orders/{number}`. Translates status
/// codes into typed outcomes; retrying is the pipeline's business, not ours.
#[derive(Debug, Clone)]
pub struct HttpAccrualClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAccrualClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl AccrualProvider for HttpAccrualClient {
    async fn get_order_accrual(&self, number: &str) -> Result<OrderAccrual, AccrualError> {
        let url = format!("{}/api/orders/{}", self.base_url, number);
        let response = self.http.get(&url).send().await.map_err(|e| AccrualError::Unknown(e.into()))?;

        match response.status() {
            StatusCode::OK => response.json::<OrderAccrual>().await.map_err(|e| AccrualError::Unknown(e.into())),
            StatusCode::NO_CONTENT => Err(AccrualError::NoContent),
            StatusCode::TOO_MANY_REQUESTS => {
                Err(AccrualError::RetryAfter { retry_after: parse_retry_after(response.headers()) })
            }
            status => Err(AccrualError::Unknown(anyhow!("unexpected accrual response status: {status}"))),
        }
    }
}

/// `Retry-After` in seconds; malformed or absent headers fall back to 60 s.
fn parse_retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map_or(DEFAULT_RETRY_AFTER, Duration::from_secs)
}
