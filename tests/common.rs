#![allow(dead_code)]

use async_trait::async_trait;
use gophermart::Services;
use gophermart::adapters::accrual::{AccrualError, AccrualProvider, AccrualStatus, OrderAccrual};
use gophermart::adapters::database;
use gophermart::adapters::database::balance_repo::BalanceRepository;
use gophermart::adapters::database::order_repo::OrderRepository;
use gophermart::adapters::database::refresh_token_repo::RefreshTokenRepository;
use gophermart::adapters::database::transaction_repo::TransactionRepository;
use gophermart::adapters::database::user_repo::UserRepository;
use gophermart::api;
use gophermart::services::{AuthConfig, AuthService, OrderService, UserService};
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "StrongEnoughPassword";

static INIT: OnceLock<()> = OnceLock::new();

pub fn setup_tracing() {
    INIT.get_or_init(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

/// DB-backed tests opt out gracefully when no test database is configured.
pub async fn try_test_pool() -> Option<PgPool> {
    setup_tracing();
    let Ok(database_url) = std::env::var("GOPHERMART_TEST_DATABASE_URL") else {
        eprintln!("GOPHERMART_TEST_DATABASE_URL is not set; skipping DB-backed test");
        return None;
    };

    let pool = database::init_pool(&database_url).await.expect("Failed to connect to DB. Is Postgres running?");
    gophermart::run_migrations(&pool).await.expect("Failed to run migrations");
    Some(pool)
}

pub fn default_auth_config() -> AuthConfig {
    AuthConfig {
        secret_key: "integration-test-secret-key".to_string(),
        access_ttl: Duration::from_secs(900),
        refresh_ttl: Duration::from_secs(86_400),
    }
}

pub fn build_services(pool: &PgPool, auth: AuthConfig) -> Services {
    let auth_service =
        AuthService::new(auth, pool.clone(), RefreshTokenRepository::new()).expect("auth service should build");
    let user_service = UserService::new(
        pool.clone(),
        UserRepository::new(),
        BalanceRepository::new(),
        TransactionRepository::new(),
    )
    .expect("user service should build");
    let order_service =
        OrderService::new(pool.clone(), OrderRepository::new(), BalanceRepository::new(), TransactionRepository::new());

    Services { auth_service, user_service, order_service }
}

pub struct TestApp {
    pub server_url: String,
    pub client: reqwest::Client,
    pub pool: PgPool,
    pub services: Services,
}

impl TestApp {
    pub async fn try_spawn() -> Option<Self> {
        Self::try_spawn_with(default_auth_config()).await
    }

    pub async fn try_spawn_with(auth: AuthConfig) -> Option<Self> {
        let pool = try_test_pool().await?;
        let services = build_services(&pool, auth);

        let router = api::app_router(services.clone().into());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server");
        });

        Some(Self { server_url: format!("http://{addr}"), client: reqwest::Client::new(), pool, services })
    }

    /// Registers a user over HTTP and returns (access token, refresh token).
    pub async fn register_user(&self, username: &str) -> (String, String) {
        let response = self
            .client
            .post(format!("{}/api/user/register", self.server_url))
            .json(&serde_json::json!({"login": username, "password": TEST_PASSWORD}))
            .send()
            .await
            .expect("register request");
        assert_eq!(response.status(), reqwest::StatusCode::OK, "registration should succeed");

        let access = bearer_token(&response).expect("register should set an Authorization header");
        let refresh = refresh_cookie_value(&response).expect("register should set a refresh cookie");
        (access, refresh)
    }
}

pub fn unique_username(prefix: &str) -> String {
    let run_id = Uuid::new_v4().to_string()[..8].to_string();
    format!("{prefix}_{run_id}")
}

/// A random order number with a valid Luhn check digit. Numbers are unique
/// across users, so every test mints fresh ones.
pub fn luhn_number() -> String {
    let mut rng = rand::thread_rng();
    let mut digits: Vec<u8> = (0..11).map(|_| rng.gen_range(0..10u8)).collect();

    let mut sum = 0u32;
    for (i, &digit) in digits.iter().rev().enumerate() {
        let mut value = u32::from(digit);
        if i % 2 == 0 {
            value *= 2;
            if value > 9 {
                value -= 9;
            }
        }
        sum += value;
    }
    digits.push(u8::try_from((10 - sum % 10) % 10).expect("check digit fits"));

    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

pub fn bearer_token(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(ToString::to_string)
}

pub fn refresh_cookie_value(response: &reqwest::Response) -> Option<String> {
    let header = response.headers().get(reqwest::header::SET_COOKIE)?.to_str().ok()?;
    header.strip_prefix("refreshtoken=")?.split(';').next().map(ToString::to_string)
}

#[derive(Debug, Clone)]
pub enum ScriptStep {
    Reply { status: AccrualStatus, accrual: Option<Decimal> },
    NoContent,
    RetryAfter(u64),
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTag {
    Reply,
    NoContent,
    RetryAfter,
    Unknown,
}

/// In-process stand-in for the external scoring service: pops scripted steps
/// and falls back to a fixed reply, recording when and how each call was
/// answered.
#[derive(Debug)]
pub struct ScriptedAccrual {
    script: Mutex<VecDeque<ScriptStep>>,
    fallback: ScriptStep,
    calls: Mutex<Vec<(Instant, CallTag)>>,
}

impl ScriptedAccrual {
    pub fn new(script: Vec<ScriptStep>, fallback: ScriptStep) -> Self {
        Self { script: Mutex::new(script.into()), fallback, calls: Mutex::new(Vec::new()) }
    }

    pub fn always(status: AccrualStatus, accrual: Option<Decimal>) -> Self {
        Self::new(Vec::new(), ScriptStep::Reply { status, accrual })
    }

    pub fn calls(&self) -> Vec<(Instant, CallTag)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl AccrualProvider for ScriptedAccrual {
    async fn get_order_accrual(&self, number: &str) -> Result<OrderAccrual, AccrualError> {
        let step = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        let (tag, outcome) = match step {
            ScriptStep::Reply { status, accrual } => {
                (CallTag::Reply, Ok(OrderAccrual { order: number.to_string(), status, accrual }))
            }
            ScriptStep::NoContent => (CallTag::NoContent, Err(AccrualError::NoContent)),
            ScriptStep::RetryAfter(secs) => (
                CallTag::RetryAfter,
                Err(AccrualError::RetryAfter { retry_after: Duration::from_secs(secs) }),
            ),
            ScriptStep::Unknown => {
                (CallTag::Unknown, Err(AccrualError::Unknown(anyhow::anyhow!("scripted failure"))))
            }
        };

        self.calls.lock().expect("calls lock").push((Instant::now(), tag));
        outcome
    }
}
