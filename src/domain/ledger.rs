use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Accrual,
    Withdrawal,
}

impl TransactionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accrual => "accrual",
            Self::Withdrawal => "withdrawal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accrual" => Some(Self::Accrual),
            "withdrawal" => Some(Self::Withdrawal),
            _ => None,
        }
    }
}

/// Append-only ledger entry. The tuple of transactions is the authoritative
/// history; the balance row is derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub processed_at: OffsetDateTime,
}

impl LedgerTransaction {
    pub fn accrual(user_id: Uuid, order_number: &str, amount: Decimal, now: OffsetDateTime) -> Self {
        Self::new(user_id, order_number, TransactionKind::Accrual, amount, now)
    }

    pub fn withdrawal(user_id: Uuid, order_number: &str, amount: Decimal, now: OffsetDateTime) -> Self {
        Self::new(user_id, order_number, TransactionKind::Withdrawal, amount, now)
    }

    fn new(user_id: Uuid, order_number: &str, kind: TransactionKind, amount: Decimal, now: OffsetDateTime) -> Self {
        Self { id: Uuid::new_v4(), user_id, order_number: order_number.to_string(), kind, amount, processed_at: now }
    }
}
