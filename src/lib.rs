pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;
pub mod workers;

use crate::adapters::accrual::AccrualProvider;
use crate::adapters::database::DbPool;
use crate::adapters::database::balance_repo::BalanceRepository;
use crate::adapters::database::order_repo::OrderRepository;
use crate::adapters::database::refresh_token_repo::RefreshTokenRepository;
use crate::adapters::database::transaction_repo::TransactionRepository;
use crate::adapters::database::user_repo::UserRepository;
use crate::config::Config;
use crate::services::{AuthConfig, AuthService, OrderService, UserService};
use crate::workers::{AccrualConsumerPool, OrderProducer, Throttle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Producer -> consumers hand-off stays nearly unbuffered; backpressure is
/// the point, the producer re-polls anything it could not deliver.
const ACCRUAL_CHANNEL_CAPACITY: usize = 1;

#[derive(Clone, Debug)]
pub struct Services {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub order_service: OrderService,
}

#[derive(Debug)]
pub struct Workers {
    pub producer: OrderProducer,
    pub consumers: AccrualConsumerPool,
}

impl Workers {
    #[must_use]
    pub fn spawn_all(self, shutdown_rx: watch::Receiver<bool>) -> Vec<tokio::task::JoinHandle<()>> {
        let producer = self.producer;
        let producer_rx = shutdown_rx.clone();
        let mut tasks = vec![tokio::spawn(async move {
            producer.run(producer_rx).await;
        })];

        tasks.extend(self.consumers.spawn(shutdown_rx));
        tasks
    }
}

#[derive(Debug)]
pub struct App {
    pub services: Services,
    pub workers: Workers,
}

/// Builder for constructing and wiring the application object graph.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    pool: Option<DbPool>,
    accrual: Option<Arc<dyn AccrualProvider>>,
}

impl AppBuilder {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config, pool: None, accrual: None }
    }

    #[must_use]
    pub fn with_database(mut self, pool: DbPool) -> Self {
        self.pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_accrual(mut self, accrual: Arc<dyn AccrualProvider>) -> Self {
        self.accrual = Some(accrual);
        self
    }

    /// Wires repositories, services and the accrual pipeline.
    ///
    /// # Errors
    /// Returns an error if mandatory dependencies are missing or a service
    /// fails to initialize.
    pub fn build(self) -> anyhow::Result<App> {
        let pool = self.pool.ok_or_else(|| anyhow::anyhow!("Database pool is required"))?;
        let accrual = self.accrual.ok_or_else(|| anyhow::anyhow!("Accrual provider is required"))?;
        let config = &self.config;

        let user_repo = UserRepository::new();
        let balance_repo = BalanceRepository::new();
        let transaction_repo = TransactionRepository::new();
        let order_repo = OrderRepository::new();
        let refresh_repo = RefreshTokenRepository::new();

        let auth_service = AuthService::new(
            AuthConfig {
                secret_key: config.secret_key.clone(),
                access_ttl: Duration::from_secs(config.access_token_ttl_secs),
                refresh_ttl: Duration::from_secs(config.refresh_token_ttl_secs),
            },
            pool.clone(),
            refresh_repo,
        )?;
        let user_service =
            UserService::new(pool.clone(), user_repo, balance_repo.clone(), transaction_repo.clone())?;
        let order_service = OrderService::new(pool, order_repo, balance_repo, transaction_repo);

        let (order_tx, order_rx) = mpsc::channel(ACCRUAL_CHANNEL_CAPACITY);
        let throttle = Arc::new(Throttle::new());

        let producer = OrderProducer::new(
            order_service.clone(),
            order_tx,
            config.accrual_poll_interval_secs,
            config.accrual_poll_batch_size,
        );
        let consumers =
            AccrualConsumerPool::new(order_service.clone(), accrual, order_rx, throttle, config.accrual_workers);

        Ok(App {
            services: Services { auth_service, user_service, order_service },
            workers: Workers { producer, consumers },
        })
    }
}

/// Runs database migrations.
///
/// # Errors
/// Returns an error if migrations fail.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!().run(pool).await.map_err(Into::into)
}

/// Returns a future that completes when a termination signal is received.
///
/// # Panics
/// Panics if the signal handlers cannot be installed.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}

/// Spawns a task that listens for OS signals and broadcasts a shutdown signal.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });
}
