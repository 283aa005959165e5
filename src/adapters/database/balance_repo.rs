use crate::adapters::database::records::BalanceRecord;
use crate::adapters::database::{CHECK_VIOLATION, sqlstate};
use crate::domain::ledger::{LedgerTransaction, TransactionKind};
use crate::domain::user::Balance;
use crate::error::{AppError, Result};
use sqlx::PgConnection;
use uuid::Uuid;

const SELECT_BALANCE: &str = "SELECT user_id, current, withdrawn FROM balances WHERE user_id = $1";

#[derive(Clone, Debug, Default)]
pub struct BalanceRepository {}

impl BalanceRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    pub async fn create(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<()> {
        sqlx::query("INSERT INTO balances (user_id, current, withdrawn) VALUES ($1, 0, 0)")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn get(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<Option<Balance>> {
        let record = sqlx::query_as::<_, BalanceRecord>(SELECT_BALANCE).bind(user_id).fetch_optional(conn).await?;
        Ok(record.map(Into::into))
    }

    /// Row-level lock; every transaction that will mutate the balance, or
    /// gate a decision on it, reads through this.
    pub async fn get_for_update(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<Option<Balance>> {
        let record = sqlx::query_as::<_, BalanceRecord>(
            "SELECT user_id, current, withdrawn FROM balances WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
        Ok(record.map(Into::into))
    }

    /// Applies a ledger entry to the aggregate: accruals credit `current`,
    /// withdrawals debit `current` and grow `withdrawn`. The store-level
    /// `current >= 0` CHECK is the second line of defense against races and
    /// maps to `BalanceInsufficient`.
    pub async fn apply(&self, conn: &mut PgConnection, transaction: &LedgerTransaction) -> Result<Balance> {
        let query = match transaction.kind {
            TransactionKind::Accrual => {
                r#"
                UPDATE balances SET current = current + $2
                WHERE user_id = $1
                RETURNING user_id, current, withdrawn
                "#
            }
            TransactionKind::Withdrawal => {
                r#"
                UPDATE balances SET current = current - $2, withdrawn = withdrawn + $2
                WHERE user_id = $1
                RETURNING user_id, current, withdrawn
                "#
            }
        };

        let record = sqlx::query_as::<_, BalanceRecord>(query)
            .bind(transaction.user_id)
            .bind(transaction.amount)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                if sqlstate(&e).as_deref() == Some(CHECK_VIOLATION) {
                    AppError::BalanceInsufficient
                } else {
                    AppError::Store(e)
                }
            })?;

        record.map(Into::into).ok_or(AppError::UserNotFound)
    }
}
