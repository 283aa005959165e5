use crate::adapters::database::balance_repo::BalanceRepository;
use crate::adapters::database::order_repo::{OrderFilter, OrderRepository};
use crate::adapters::database::transaction_repo::TransactionRepository;
use crate::adapters::database::{DbPool, pg_now};
use crate::domain::ledger::LedgerTransaction;
use crate::domain::order::{Order, OrderStatus, luhn_valid};
use crate::error::{AppError, Result};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Terminal outcome of accrual processing. The accrual amount exists exactly
/// for successfully processed orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Processed { accrual: Decimal },
    Invalid,
}

impl Resolution {
    const fn status(self) -> OrderStatus {
        match self {
            Self::Processed { .. } => OrderStatus::Processed,
            Self::Invalid => OrderStatus::Invalid,
        }
    }

    const fn accrual(self) -> Option<Decimal> {
        match self {
            Self::Processed { accrual } => Some(accrual),
            Self::Invalid => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderService {
    pool: DbPool,
    orders: OrderRepository,
    balances: BalanceRepository,
    transactions: TransactionRepository,
}

impl OrderService {
    #[must_use]
    pub fn new(
        pool: DbPool,
        orders: OrderRepository,
        balances: BalanceRepository,
        transactions: TransactionRepository,
    ) -> Self {
        Self { pool, orders, balances, transactions }
    }

    /// Claims an order number for a user. The number is unique across all
    /// users; re-uploading one's own order surfaces the original row.
    #[tracing::instrument(skip(self), fields(order = %number))]
    pub async fn create_order(&self, number: &str, user_id: Uuid) -> Result<Order> {
        if !luhn_valid(number) {
            return Err(AppError::OrderNumberInvalid);
        }

        let candidate = Order::new(number, user_id, pg_now());
        let mut conn = self.pool.acquire().await?;
        let row = self.orders.create(&mut conn, &candidate).await?;

        if row.id == candidate.id {
            tracing::info!(user_id = %user_id, "Order uploaded");
            Ok(row)
        } else if row.user_id == user_id {
            Err(AppError::OrderAlreadyExists(Box::new(row)))
        } else {
            Err(AppError::OrderNumberTaken)
        }
    }

    /// Moves an order into a terminal status, crediting the owner's balance
    /// for a positive accrual, all in one transaction. Lock order is fixed
    /// globally: order row first, then the owner's balance row.
    #[tracing::instrument(skip(self), fields(order = %number))]
    pub async fn mark_processed(&self, number: &str, resolution: Resolution) -> Result<Order> {
        if let Resolution::Processed { accrual } = resolution
            && accrual < Decimal::ZERO
        {
            tracing::warn!(accrual = %accrual, "Refusing negative accrual");
            return Err(AppError::Internal);
        }

        let mut tx = self.pool.begin().await?;
        let order = self.orders.get_for_update(&mut tx, number).await?.ok_or(AppError::OrderNotFound)?;
        if order.status.is_terminal() {
            return Err(AppError::OrderAlreadyProcessed);
        }
        self.balances.get_for_update(&mut tx, order.user_id).await?.ok_or(AppError::UserNotFound)?;

        if let Resolution::Processed { accrual } = resolution
            && accrual > Decimal::ZERO
        {
            let transaction = LedgerTransaction::accrual(order.user_id, &order.number, accrual, pg_now());
            self.transactions.create(&mut tx, &transaction).await?;
            self.balances.apply(&mut tx, &transaction).await?;
        }

        let updated = self.orders.update(&mut tx, number, resolution.status(), resolution.accrual()).await?;
        tx.commit().await?;

        tracing::info!(status = updated.status.as_str(), "Order resolved");
        Ok(updated)
    }

    /// Non-terminal transition: the upstream scorer has seen the order but
    /// has not settled it yet. No accrual, no balance change.
    pub async fn mark_processing(&self, number: &str) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        self.orders.set_processing(&mut conn, number).await?;
        Ok(())
    }

    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let mut conn = self.pool.acquire().await?;
        self.orders.list(&mut conn, filter).await
    }
}
