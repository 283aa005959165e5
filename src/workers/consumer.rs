use crate::adapters::accrual::{AccrualError, AccrualProvider, AccrualStatus, OrderAccrual};
use crate::domain::order::Order;
use crate::error::AppError;
use crate::services::{OrderService, Resolution};
use crate::workers::throttle::Throttle;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

/// N workers draining a single channel of orders. They coordinate through
/// nothing but the channel and the shared throttle; duplicate deliveries are
/// harmless because terminal orders refuse further transitions.
#[derive(Debug)]
pub struct AccrualConsumerPool {
    orders: OrderService,
    accrual: Arc<dyn AccrualProvider>,
    rx: Arc<Mutex<mpsc::Receiver<Order>>>,
    throttle: Arc<Throttle>,
    workers: usize,
}

impl AccrualConsumerPool {
    #[must_use]
    pub fn new(
        orders: OrderService,
        accrual: Arc<dyn AccrualProvider>,
        rx: mpsc::Receiver<Order>,
        throttle: Arc<Throttle>,
        workers: usize,
    ) -> Self {
        Self { orders, accrual, rx: Arc::new(Mutex::new(rx)), throttle, workers }
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        (0..self.workers)
            .map(|index| {
                let worker = Worker {
                    orders: self.orders.clone(),
                    accrual: Arc::clone(&self.accrual),
                    rx: Arc::clone(&self.rx),
                    throttle: Arc::clone(&self.throttle),
                };
                let worker_shutdown = shutdown.clone();
                tokio::spawn(
                    async move { worker.run(worker_shutdown).await }
                        .instrument(tracing::info_span!("accrual_worker", worker = index)),
                )
            })
            .collect()
    }
}

#[derive(Debug)]
struct Worker {
    orders: OrderService,
    accrual: Arc<dyn AccrualProvider>,
    rx: Arc<Mutex<mpsc::Receiver<Order>>>,
    throttle: Arc<Throttle>,
}

impl Worker {
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            // Leave the channel alone while the pool is throttled.
            if !self.honor_throttle(&mut shutdown).await {
                continue;
            }

            let received = {
                let mut rx = self.rx.lock().await;
                tokio::select! {
                    order = rx.recv() => Some(order),
                    _ = shutdown.changed() => None,
                }
            };

            match received {
                None => continue,
                Some(None) => break,
                Some(Some(order)) => {
                    // The window may have closed while we sat in recv; no
                    // request goes out until it reopens. An order abandoned
                    // here on shutdown is rediscovered by the producer.
                    if self.honor_throttle(&mut shutdown).await {
                        self.process(order).await;
                    }
                }
            }
        }

        tracing::debug!("Accrual worker shutting down...");
    }

    /// Sleeps out the shared quiet window. Returns false if shutdown was
    /// requested, true once requests may be issued.
    async fn honor_throttle(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        while let Some(wait) = self.throttle.remaining() {
            if *shutdown.borrow() {
                return false;
            }
            tokio::select! {
                () = tokio::time::sleep(wait) => {}
                _ = shutdown.changed() => {}
            }
        }
        !*shutdown.borrow()
    }

    async fn process(&self, order: Order) {
        match self.accrual.get_order_accrual(&order.number).await {
            Ok(accrual) => self.apply_outcome(&order, accrual).await,
            Err(AccrualError::RetryAfter { retry_after }) => {
                tracing::info!(order = %order.number, pause = ?retry_after, "Accrual system throttled the pool");
                self.throttle.hold_for(retry_after);
            }
            Err(AccrualError::NoContent) => {
                tracing::debug!(order = %order.number, "Order unknown upstream, marking invalid");
                self.resolve(&order.number, Resolution::Invalid).await;
            }
            Err(AccrualError::Unknown(e)) => {
                tracing::warn!(order = %order.number, error = %e, "Accrual request failed, leaving for re-poll");
            }
        }
    }

    async fn apply_outcome(&self, order: &Order, accrual: OrderAccrual) {
        match accrual.status {
            AccrualStatus::Processed => {
                let amount = accrual.accrual.unwrap_or(Decimal::ZERO);
                self.resolve(&accrual.order, Resolution::Processed { accrual: amount }).await;
            }
            AccrualStatus::Invalid => self.resolve(&accrual.order, Resolution::Invalid).await,
            AccrualStatus::Registered | AccrualStatus::Processing => {
                if let Err(e) = self.orders.mark_processing(&accrual.order).await {
                    tracing::error!(order = %order.number, error = %e, "Failed to mark order processing");
                }
            }
        }
    }

    async fn resolve(&self, number: &str, resolution: Resolution) {
        match self.orders.mark_processed(number, resolution).await {
            Ok(_) => {}
            // Another worker settled it first; the terminal-state guard is
            // the pipeline's only deduplication.
            Err(AppError::OrderAlreadyProcessed) => {
                tracing::debug!(order = %number, "Order already settled");
            }
            Err(e) => {
                tracing::error!(order = %number, error = %e, "Failed to resolve order");
            }
        }
    }
}
