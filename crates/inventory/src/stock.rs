//! Stock level arithmetic.
//!
//! The store performs the actual update with a conditional SQL statement;
//! these types decide ahead of time whether a change is allowed and what it
//! records.

use serde::{Deserialize, Serialize};

use pharmastock_core::{DomainError, DomainResult};

/// Units on hand for one product. Never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    code: String,
    units: i64,
}

impl StockLevel {
    pub fn new(code: impl Into<String>, units: i64) -> DomainResult<Self> {
        let code = code.into();
        if units < 0 {
            return Err(DomainError::invariant(format!(
                "stock of {code} cannot be negative ({units})"
            )));
        }
        Ok(Self { code, units })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn units(&self) -> i64 {
        self.units
    }

    /// Take `quantity` units out (a sale).
    pub fn withdraw(&self, quantity: i64) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }
        if quantity > self.units {
            return Err(DomainError::insufficient_stock(&self.code, quantity, self.units));
        }
        Ok(Self {
            code: self.code.clone(),
            units: self.units - quantity,
        })
    }

    /// Put `quantity` units in (a lot receipt).
    pub fn receive(&self, quantity: i64) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }
        let units = self
            .units
            .checked_add(quantity)
            .ok_or_else(|| DomainError::invariant("stock overflow"))?;
        Ok(Self {
            code: self.code.clone(),
            units,
        })
    }

    /// Apply a signed manual correction.
    pub fn adjust(&self, delta: i64) -> DomainResult<(Self, StockAdjustment)> {
        if delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }

        let units = self
            .units
            .checked_add(delta)
            .ok_or_else(|| DomainError::invariant("stock overflow"))?;
        if units < 0 {
            return Err(DomainError::invariant(format!(
                "stock of {} cannot go negative ({} {delta:+})",
                self.code, self.units
            )));
        }

        Ok((
            Self {
                code: self.code.clone(),
                units,
            },
            StockAdjustment { delta },
        ))
    }
}

/// A non-zero signed stock correction.
///
/// Movements store unsigned quantities, so the sign travels in the notes as
/// a `+n` / `-n` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    delta: i64,
}

impl StockAdjustment {
    pub fn delta(&self) -> i64 {
        self.delta
    }

    pub fn quantity(&self) -> i64 {
        self.delta.abs()
    }

    pub fn notes(&self, reason: &str) -> String {
        let reason = reason.trim();
        if reason.is_empty() {
            format!("{:+}", self.delta)
        } else {
            format!("{:+} {reason}", self.delta)
        }
    }
}
