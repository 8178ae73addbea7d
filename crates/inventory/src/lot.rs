use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pharmastock_core::error::required;
use pharmastock_core::{DomainError, DomainResult, Entity, LotId, Money, ProductId, SupplierId};

/// Days ahead of expiry at which lots are flagged.
pub const DEFAULT_EXPIRY_WARNING_DAYS: u32 = 90;

/// A received batch of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub id: LotId,
    pub product_id: ProductId,
    pub code: String,
    pub quantity: i64,
    pub entered_at: DateTime<Utc>,
    pub expires_on: NaiveDate,
    /// Unit cost paid to the supplier.
    pub cost: Money,
    pub supplier_id: Option<SupplierId>,
}

impl Entity for Lot {
    type Id = LotId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Lot {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_on < today
    }

    /// Expired already, or expiring within `days` of `today`.
    pub fn expires_within(&self, today: NaiveDate, days: u32) -> bool {
        ExpiryWindow::new(days).contains(today, self.expires_on)
    }
}

/// A lot joined with the names shown next to it in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotDetails {
    pub lot: Lot,
    pub product_code: String,
    pub product_name: String,
    pub supplier_name: Option<String>,
}

/// Look-ahead window for expiry warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryWindow {
    days: u32,
}

impl Default for ExpiryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_EXPIRY_WARNING_DAYS)
    }
}

impl ExpiryWindow {
    pub fn new(days: u32) -> Self {
        Self { days }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Last day (inclusive) that still falls in the window.
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_days(Days::new(u64::from(self.days)))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, today: NaiveDate, expires_on: NaiveDate) -> bool {
        expires_on <= self.cutoff(today)
    }
}

/// Input to receive a lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLot {
    pub product_id: ProductId,
    pub code: String,
    pub quantity: i64,
    pub expires_on: NaiveDate,
    pub cost: Money,
    pub supplier_id: Option<SupplierId>,
}

impl NewLot {
    pub fn validate(self, today: NaiveDate) -> DomainResult<Self> {
        let code = required("lot code", &self.code)?;
        if self.quantity <= 0 {
            return Err(DomainError::validation("lot quantity must be greater than zero"));
        }
        if self.expires_on < today {
            return Err(DomainError::validation(format!(
                "lot expiration date {} is in the past",
                self.expires_on
            )));
        }
        Ok(Self { code, ..self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_lot() -> NewLot {
        NewLot {
            product_id: ProductId::new(1),
            code: " L-2024-01 ".to_string(),
            quantity: 50,
            expires_on: date(2025, 12, 31),
            cost: Money::from_cents(800).unwrap(),
            supplier_id: None,
        }
    }

    fn lot(expires_on: NaiveDate) -> Lot {
        Lot {
            id: LotId::new(1),
            product_id: ProductId::new(1),
            code: "L1".to_string(),
            quantity: 5,
            entered_at: Utc::now(),
            expires_on,
            cost: Money::ZERO,
            supplier_id: None,
        }
    }

    #[test]
    fn valid_lot_is_trimmed() {
        let lot = new_lot().validate(date(2024, 6, 1)).unwrap();
        assert_eq!(lot.code, "L-2024-01");
    }

    #[test]
    fn quantity_must_be_positive() {
        let mut l = new_lot();
        l.quantity = 0;
        match l.validate(date(2024, 6, 1)).unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("quantity")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn expired_lots_are_rejected_on_receipt() {
        let l = new_lot();
        assert!(l.validate(date(2026, 1, 1)).is_err());
    }

    #[test]
    fn expiry_window_includes_expired_and_boundary() {
        let today = date(2024, 1, 1);
        let window = ExpiryWindow::default();
        assert_eq!(window.cutoff(today), date(2024, 3, 31));

        assert!(lot(date(2023, 12, 1)).expires_within(today, 90));
        assert!(lot(date(2024, 3, 31)).expires_within(today, 90));
        assert!(!lot(date(2024, 4, 1)).expires_within(today, 90));
        assert!(lot(date(2023, 12, 1)).is_expired(today));
    }
}
