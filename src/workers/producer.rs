use crate::adapters::database::order_repo::OrderFilter;
use crate::domain::order::Order;
use crate::error::Result;
use crate::services::OrderService;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

/// Periodically rediscovers orders in a non-terminal status and feeds them to
/// the consumer pool. Re-polling is the pipeline's only retry mechanism:
/// anything a worker drops will simply be picked up again on a later tick.
#[derive(Debug)]
pub struct OrderProducer {
    orders: OrderService,
    tx: mpsc::Sender<Order>,
    interval_secs: u64,
    batch_size: i64,
}

impl OrderProducer {
    #[must_use]
    pub fn new(orders: OrderService, tx: mpsc::Sender<Order>, interval_secs: u64, batch_size: i64) -> Self {
        Self { orders, tx, interval_secs, batch_size }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = self.interval_secs, batch_size = self.batch_size, "Order producer started");

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.changed() => {}
            }
            if *shutdown.borrow() {
                break;
            }
            if let Err(e) = self.emit_batch(&mut shutdown).await {
                tracing::error!(error = %e, "Failed to poll unfinished orders");
            }
        }

        tracing::info!("Order producer shutting down...");
    }

    /// A blocked send races shutdown so the producer aborts promptly; the
    /// undelivered remainder of the batch is rediscovered on the next tick.
    async fn emit_batch(&self, shutdown: &mut watch::Receiver<bool>) -> Result<()> {
        let batch = self.orders.list_orders(&OrderFilter::unfinished(self.batch_size)).await?;
        if batch.is_empty() {
            return Ok(());
        }

        tracing::debug!(count = batch.len(), "Dispatching unfinished orders");

        for order in batch {
            tokio::select! {
                sent = self.tx.send(order) => {
                    if sent.is_err() {
                        tracing::warn!("Accrual channel closed, dropping batch");
                        return Ok(());
                    }
                }
                _ = shutdown.changed() => return Ok(()),
            }
        }

        Ok(())
    }
}
