use crate::adapters::database::balance_repo::BalanceRepository;
use crate::adapters::database::transaction_repo::TransactionRepository;
use crate::adapters::database::user_repo::UserRepository;
use crate::adapters::database::{DbPool, pg_now};
use crate::domain::auth::Password;
use crate::domain::ledger::{LedgerTransaction, TransactionKind};
use crate::domain::order::luhn_valid;
use crate::domain::user::{Balance, User};
use crate::error::{AppError, Result};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserService {
    pool: DbPool,
    users: UserRepository,
    balances: BalanceRepository,
    transactions: TransactionRepository,
    /// Verified against when login misses a user row, keeping the timing
    /// profile of both outcomes identical.
    fallback_hash: String,
}

impl UserService {
    /// # Errors
    /// Returns an error if the fallback password hash cannot be computed.
    pub fn new(
        pool: DbPool,
        users: UserRepository,
        balances: BalanceRepository,
        transactions: TransactionRepository,
    ) -> Result<Self> {
        let fallback_hash = Password::hash("gophermart-fallback-credential")?;
        Ok(Self { pool, users, balances, transactions, fallback_hash })
    }

    /// Creates the user and its zero balance as one atomic unit.
    #[tracing::instrument(skip(self, password))]
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User> {
        if password.is_empty() {
            return Err(AppError::InvalidPassword);
        }
        let password_hash = Password::hash(password)?;
        let user =
            User { id: Uuid::new_v4(), username: username.to_string(), password_hash, created_at: pg_now() };

        let mut tx = self.pool.begin().await?;
        let user = self.users.create(&mut tx, &user).await?;
        self.balances.create(&mut tx, user.id).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// A password check runs whether or not the user exists, and every
    /// failure collapses into the same error, so response timing and shape
    /// never reveal whether a username is taken.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let mut conn = self.pool.acquire().await?;
        let user = self.users.get_by_username(&mut conn, username).await?;

        let stored_hash = user.as_ref().map_or(self.fallback_hash.as_str(), |u| u.password_hash.as_str());
        let verified = Password::verify(password, stored_hash)?;

        match user {
            Some(user) if verified => Ok(user),
            _ => Err(AppError::UserNotFound),
        }
    }

    pub async fn get_by_id(&self, user_id: Uuid) -> Result<User> {
        let mut conn = self.pool.acquire().await?;
        self.users.get_by_id(&mut conn, user_id).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn get_balance(&self, user_id: Uuid) -> Result<Balance> {
        let mut conn = self.pool.acquire().await?;
        self.balances.get(&mut conn, user_id).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn get_withdrawals(&self, user_id: Uuid) -> Result<Vec<LedgerTransaction>> {
        let mut conn = self.pool.acquire().await?;
        self.transactions.list(&mut conn, user_id, Some(TransactionKind::Withdrawal)).await
    }

    /// Debits the balance against a future order number. The balance row is
    /// locked for the whole transaction; the store-level `current >= 0` CHECK
    /// backstops the in-transaction comparison.
    #[tracing::instrument(skip(self), fields(order = %order_number))]
    pub async fn withdraw(&self, user_id: Uuid, order_number: &str, amount: Decimal) -> Result<Balance> {
        if !luhn_valid(order_number) {
            return Err(AppError::OrderNumberInvalid);
        }

        let mut tx = self.pool.begin().await?;
        let balance = self.balances.get_for_update(&mut tx, user_id).await?.ok_or(AppError::UserNotFound)?;
        if balance.current < amount {
            return Err(AppError::BalanceInsufficient);
        }

        let transaction = LedgerTransaction::withdrawal(user_id, order_number, amount, pg_now());
        self.transactions.create(&mut tx, &transaction).await?;
        let balance = self.balances.apply(&mut tx, &transaction).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user_id, amount = %amount, "Points withdrawn");
        Ok(balance)
    }
}
