use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pharmastock_core::error::required;
use pharmastock_core::{DomainError, DomainResult, EmployeeId, Entity, Money, ProductId};

/// Minimum number of digits in a product code (e.g. `0001`).
pub const MIN_CODE_DIGITS: usize = 4;

/// Product availability as shown in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Available,
    OutOfStock,
}

impl StockStatus {
    pub fn from_stock(stock: i64) -> Self {
        if stock > 0 {
            Self::Available
        } else {
            Self::OutOfStock
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Available => f.write_str("available"),
            Self::OutOfStock => f.write_str("out of stock"),
        }
    }
}

/// A live catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub code: String,
    pub image_path: String,
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub expires_on: NaiveDate,
    /// Last employee who modified the product, if still on staff.
    pub modified_by: Option<EmployeeId>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Product {
    pub fn status(&self) -> StockStatus {
        StockStatus::from_stock(self.stock)
    }

    pub fn is_sellable(&self) -> bool {
        self.stock > 0
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_on < today
    }
}

/// Product snapshot kept in `deleted_products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedProduct {
    pub product: Product,
    pub deleted_at: DateTime<Utc>,
}

/// Product row with the display name of its last modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductWithModifier {
    pub product: Product,
    pub modified_by_name: String,
}

/// Placeholder shown when nobody is recorded as the last modifier.
pub const UNASSIGNED: &str = "unassigned";

// ─────────────────────────────────────────────────────────────────────────────
// Input
// ─────────────────────────────────────────────────────────────────────────────

/// Input to create a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub code: String,
    pub image_path: String,
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub expires_on: NaiveDate,
}

impl NewProduct {
    /// Validate against the current day and return the normalized input.
    pub fn validate(self, today: NaiveDate) -> DomainResult<Self> {
        let code = validate_code(&self.code)?;
        let name = required("name", &self.name)?;
        let image_path = required("image", &self.image_path)?;

        if self.stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        if self.expires_on < today {
            return Err(DomainError::validation(format!(
                "expiration date {} is in the past",
                self.expires_on
            )));
        }

        Ok(Self {
            code,
            image_path,
            name,
            ..self
        })
    }
}

/// Input to edit a product. The expiration date is not checked against
/// today, so already-expired stock can still be corrected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub code: String,
    pub image_path: String,
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub expires_on: NaiveDate,
}

impl ProductUpdate {
    pub fn validate(self) -> DomainResult<Self> {
        let code = validate_code(&self.code)?;
        let name = required("name", &self.name)?;
        if self.stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        Ok(Self {
            code,
            name,
            image_path: self.image_path.trim().to_string(),
            ..self
        })
    }
}

/// Product codes are numeric with at least [`MIN_CODE_DIGITS`] digits.
pub fn validate_code(code: &str) -> DomainResult<String> {
    let code = code.trim();
    if code.len() < MIN_CODE_DIGITS || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::validation(format!(
            "product code must be numeric with at least {MIN_CODE_DIGITS} digits, got '{code}'"
        )));
    }
    Ok(code.to_string())
}

/// Replacement code to use when restoring a deleted product.
///
/// `None` keeps the stored code. A collision with a live product is reported
/// as a conflict so the caller can retry with another code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RestoreCode(Option<String>);

impl RestoreCode {
    pub fn keep() -> Self {
        Self(None)
    }

    pub fn replace(code: &str) -> DomainResult<Self> {
        Ok(Self(Some(validate_code(code)?)))
    }

    /// Code the restored product will carry.
    pub fn resolve<'a>(&'a self, stored: &'a str) -> &'a str {
        self.0.as_deref().unwrap_or(stored)
    }
}
