use gophermart::adapters::accrual::HttpAccrualClient;
use gophermart::adapters::database;
use gophermart::config::Config;
use gophermart::{AppBuilder, api, telemetry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    telemetry::init(&config.log_level);

    // Phase 1: infrastructure.
    let pool = database::init_pool(&config.database_uri).await?;
    gophermart::run_migrations(&pool).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    gophermart::spawn_signal_handler(shutdown_tx.clone());

    let accrual = Arc::new(HttpAccrualClient::new(
        &config.accrual_system_address,
        Duration::from_secs(config.accrual_request_timeout_secs),
    )?);

    // Phase 2: component wiring.
    let app = AppBuilder::new(config.clone()).with_database(pool).with_accrual(accrual).build()?;

    // Phase 3: runtime setup.
    let router = api::app_router(app.services.into());
    let listener = tokio::net::TcpListener::bind(&config.run_address).await?;
    tracing::info!(address = %config.run_address, "listening");

    // Phase 4: start the pipeline and serve until a shutdown signal.
    let worker_tasks = app.workers.spawn_all(shutdown_rx.clone());

    let mut api_rx = shutdown_rx;
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        let _ = api_rx.wait_for(|&stop| stop).await;
    });

    if let Err(e) = server.await {
        tracing::error!(error = %e, "Server error");
    }

    // Phase 5: graceful shutdown of the pipeline, bounded by the timeout.
    let _ = shutdown_tx.send(true);
    tokio::select! {
        () = async {
            futures::future::join_all(worker_tasks).await;
        } => {
            tracing::info!("Background workers finished.");
        }
        () = tokio::time::sleep(Duration::from_secs(config.shutdown_timeout_secs)) => {
            tracing::warn!("Timeout waiting for background workers to finish.");
        }
    }

    Ok(())
}
