use crate::adapters::database::pg_now;
use crate::adapters::database::records::OrderRecord;
use crate::domain::order::{Order, OrderStatus};
use crate::error::{AppError, Result};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, number, user_id, status, accrual, uploaded_at, modified_at";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub user_id: Option<Uuid>,
    pub statuses: Option<Vec<OrderStatus>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrderFilter {
    #[must_use]
    pub fn for_user(user_id: Uuid) -> Self {
        Self { user_id: Some(user_id), ..Self::default() }
    }

    /// Orders the accrual pipeline still has to resolve.
    #[must_use]
    pub fn unfinished(limit: i64) -> Self {
        Self {
            statuses: Some(vec![OrderStatus::New, OrderStatus::Processing]),
            limit: Some(limit),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct OrderRepository {}

impl OrderRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Idempotent claim of an order number: a single statement combining the
    /// insert with a read-back of whichever row owns the number. The caller
    /// decides ownership by comparing ids.
    pub async fn create(&self, conn: &mut PgConnection, order: &Order) -> Result<Order> {
        let query = format!(
            r#"
            WITH ins AS (
                INSERT INTO orders (id, number, user_id, status, accrual, uploaded_at, modified_at)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
                ON CONFLICT (number) DO NOTHING
                RETURNING {ORDER_COLUMNS}
            )
            SELECT {ORDER_COLUMNS} FROM ins
            UNION
            SELECT {ORDER_COLUMNS} FROM orders WHERE number = $2
            "#
        );

        let record = sqlx::query_as::<_, OrderRecord>(&query)
            .bind(order.id)
            .bind(&order.number)
            .bind(order.user_id)
            .bind(order.status.as_str())
            .bind(order.accrual)
            .bind(order.uploaded_at)
            .fetch_optional(&mut *conn)
            .await?;

        match record {
            Some(record) => record.try_into(),
            // The insert lost to a concurrent commit the statement snapshot
            // predates; the winning row is visible to a fresh read.
            None => self.get(conn, &order.number).await?.ok_or(AppError::Internal),
        }
    }

    pub async fn get(&self, conn: &mut PgConnection, number: &str) -> Result<Option<Order>> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE number = $1"
        ))
        .bind(number)
        .fetch_optional(conn)
        .await?;

        record.map(Order::try_from).transpose()
    }

    /// Row-level lock. Globally, an order row is always locked before the
    /// owner's balance row.
    pub async fn get_for_update(&self, conn: &mut PgConnection, number: &str) -> Result<Option<Order>> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE number = $1 FOR UPDATE"
        ))
        .bind(number)
        .fetch_optional(conn)
        .await?;

        record.map(Order::try_from).transpose()
    }

    pub async fn list(&self, conn: &mut PgConnection, filter: &OrderFilter) -> Result<Vec<Order>> {
        let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
        let mut prefix = " WHERE ";

        if let Some(user_id) = filter.user_id {
            builder.push(prefix).push("user_id = ").push_bind(user_id);
            prefix = " AND ";
        }
        if let Some(statuses) = &filter.statuses {
            let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
            builder.push(prefix).push("status = ANY(").push_bind(statuses).push(")");
        }
        builder.push(" ORDER BY uploaded_at DESC");
        if let Some(limit) = filter.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }
        if let Some(offset) = filter.offset {
            builder.push(" OFFSET ").push_bind(offset);
        }

        let records: Vec<OrderRecord> = builder.build_query_as().fetch_all(conn).await?;
        records.into_iter().map(Order::try_from).collect()
    }

    /// Rewrites status and accrual; `modified_at` advances.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        number: &str,
        status: OrderStatus,
        accrual: Option<Decimal>,
    ) -> Result<Order> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            r#"
            UPDATE orders SET status = $2, accrual = $3, modified_at = $4
            WHERE number = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(number)
        .bind(status.as_str())
        .bind(accrual)
        .bind(pg_now())
        .fetch_optional(conn)
        .await?;

        record.map(Order::try_from).transpose()?.ok_or(AppError::OrderNotFound)
    }

    /// Non-terminal transition `new -> processing`. A no-op for any other
    /// status, so `modified_at` only advances when the row actually changes.
    pub async fn set_processing(&self, conn: &mut PgConnection, number: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE orders SET status = 'processing', modified_at = $2 WHERE number = $1 AND status = 'new'")
            .bind(number)
            .bind(pg_now())
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
