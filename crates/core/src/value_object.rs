//! Value objects: equality by value, not identity.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects have no identity: two values with the same attributes are
/// equal. To "modify" one, build a new one.
///
/// - **Value Object**: `Money(1250)` is the same amount wherever it appears.
/// - **Entity**: two products with the same name are still different products.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A non-negative amount of money in the smallest currency unit (cents).
///
/// Prices and lot costs are stored as integer cents so totals never drift the
/// way floating point sums do.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Money(i64);

impl ValueObject for Money {}

impl TryFrom<i64> for Money {
    type Error = DomainError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Self::from_cents(cents)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> DomainResult<Self> {
        if cents < 0 {
            return Err(DomainError::validation("amount cannot be negative"));
        }
        Ok(Self(cents))
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> DomainResult<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| DomainError::invariant("amount overflow"))
    }

    /// Multiply a unit price by a quantity.
    pub fn times(self, quantity: i64) -> DomainResult<Money> {
        if quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        self.0
            .checked_mul(quantity)
            .map(Money)
            .ok_or_else(|| DomainError::invariant("amount overflow"))
    }

    /// Amount as a float, for averages and display only.
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    /// Accepts `12`, `12.5`, `12.50` and the comma decimal separator (`12,50`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().replace(',', ".");
        if text.is_empty() {
            return Err(DomainError::validation("amount cannot be empty"));
        }
        if text.starts_with('-') {
            return Err(DomainError::validation("amount cannot be negative"));
        }

        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text.as_str(), ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(DomainError::validation(format!("invalid amount '{s}'")));
        }
        if fraction.len() > 2 {
            return Err(DomainError::validation(format!(
                "amount '{s}' has more than two decimals"
            )));
        }

        let whole: i64 = whole
            .parse()
            .map_err(|_| DomainError::validation(format!("amount '{s}' is too large")))?;
        let fraction_cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().unwrap_or(0) * 10,
            _ => fraction.parse::<i64>().unwrap_or(0),
        };

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_cents))
            .map(Money)
            .ok_or_else(|| DomainError::validation(format!("amount '{s}' is too large")))
    }
}
