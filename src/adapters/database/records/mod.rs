mod auth;
mod ledger;
mod order;
mod user;

pub(crate) use auth::RefreshTokenRecord;
pub(crate) use ledger::TransactionRecord;
pub(crate) use order::OrderRecord;
pub(crate) use user::{BalanceRecord, UserRecord};
