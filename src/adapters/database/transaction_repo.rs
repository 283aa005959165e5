use crate::adapters::database::records::TransactionRecord;
use crate::adapters::database::{FOREIGN_KEY_VIOLATION, sqlstate};
use crate::domain::ledger::{LedgerTransaction, TransactionKind};
use crate::error::{AppError, Result};
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct TransactionRepository {}

impl TransactionRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Appends a ledger entry. A missing user maps to `UserNotFound`.
    pub async fn create(&self, conn: &mut PgConnection, transaction: &LedgerTransaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, user_id, order_number, kind, amount, processed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.user_id)
        .bind(&transaction.order_number)
        .bind(transaction.kind.as_str())
        .bind(transaction.amount)
        .bind(transaction.processed_at)
        .execute(conn)
        .await
        .map_err(|e| {
            if sqlstate(&e).as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                AppError::UserNotFound
            } else {
                AppError::Store(e)
            }
        })?;

        Ok(())
    }

    pub async fn list(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        kind: Option<TransactionKind>,
    ) -> Result<Vec<LedgerTransaction>> {
        let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(
            "SELECT id, user_id, order_number, kind, amount, processed_at FROM transactions WHERE user_id = ",
        );
        builder.push_bind(user_id);
        if let Some(kind) = kind {
            builder.push(" AND kind = ").push_bind(kind.as_str());
        }
        builder.push(" ORDER BY processed_at DESC");

        let records: Vec<TransactionRecord> = builder.build_query_as().fetch_all(conn).await?;
        records.into_iter().map(LedgerTransaction::try_from).collect()
    }
}
