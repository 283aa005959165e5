use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    New,
    Processing,
    Processed,
    Invalid,
}

impl OrderStatus {
    /// Terminal statuses admit no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Processed | Self::Invalid)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::Invalid => "invalid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "processing" => Some(Self::Processing),
            "processed" => Some(Self::Processed),
            "invalid" => Some(Self::Invalid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub number: String,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub accrual: Option<Decimal>,
    pub uploaded_at: OffsetDateTime,
    pub modified_at: OffsetDateTime,
}

impl Order {
    /// A freshly uploaded order, before the store has claimed the number.
    pub fn new(number: &str, user_id: Uuid, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            number: number.to_string(),
            user_id,
            status: OrderStatus::New,
            accrual: None,
            uploaded_at: now,
            modified_at: now,
        }
    }
}

/// Luhn checksum over an ASCII digit string. Right to left, every second
/// digit is doubled and digit-summed; the total must be divisible by 10.
/// Empty strings and non-digit characters are invalid.
pub fn luhn_valid(number: &str) -> bool {
    if number.is_empty() {
        return false;
    }

    let mut sum = 0u32;
    for (i, byte) in number.bytes().rev().enumerate() {
        if !byte.is_ascii_digit() {
            return false;
        }
        let mut digit = u32::from(byte - b'0');
        if i % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }

    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_numbers() {
        for number in ["79927398713", "17893729974", "2377225624", "0"] {
            assert!(luhn_valid(number), "{number} should be valid");
        }
    }

    #[test]
    fn rejects_single_digit_corruptions() {
        let valid = "79927398713";
        for (i, byte) in valid.bytes().enumerate() {
            let original = byte - b'0';
            for replacement in 0..10u8 {
                if replacement == original {
                    continue;
                }
                let mut corrupted = valid.as_bytes().to_vec();
                corrupted[i] = b'0' + replacement;
                let corrupted = String::from_utf8(corrupted).unwrap();
                assert!(!luhn_valid(&corrupted), "{corrupted} should be invalid");
            }
        }
    }

    #[test]
    fn rejects_empty_and_non_digits() {
        assert!(!luhn_valid(""));
        assert!(!luhn_valid("7992739871a"));
        assert!(!luhn_valid(" 79927398713"));
        assert!(!luhn_valid("79-92"));
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Processed.is_terminal());
        assert!(OrderStatus::Invalid.is_terminal());
        assert!(!OrderStatus::New.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
    }

    #[test]
    fn status_roundtrip() {
        for status in [OrderStatus::New, OrderStatus::Processing, OrderStatus::Processed, OrderStatus::Invalid] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("NEW"), None);
    }

    #[test]
    fn wire_form_is_uppercase() {
        assert_eq!(serde_json::to_string(&OrderStatus::New).unwrap(), r#""NEW""#);
        assert_eq!(serde_json::to_string(&OrderStatus::Processing).unwrap(), r#""PROCESSING""#);
    }
}
