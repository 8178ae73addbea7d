use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pharmastock_core::{DomainError, DomainResult, Money, ProductId, SaleId};
use pharmastock_products::Product;

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub code: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    /// Stock known when the product was added; caps `quantity`.
    pub available: i64,
}

impl CartLine {
    pub fn subtotal(&self) -> DomainResult<Money> {
        self.unit_price.times(self.quantity)
    }
}

/// Point-of-sale cart. At most one line per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` units of `product`, merging with an existing line.
    pub fn add(&mut self, product: &Product, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let existing = self
            .lines
            .iter()
            .position(|line| line.product_id == product.id);
        let already = existing.map_or(0, |i| self.lines[i].quantity);
        let wanted = already
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("quantity is too large"))?;

        if wanted > product.stock {
            return Err(DomainError::insufficient_stock(
                &product.code,
                wanted,
                product.stock,
            ));
        }

        match existing {
            Some(i) => {
                let line = &mut self.lines[i];
                line.quantity = wanted;
                line.available = product.stock;
                line.unit_price = product.price;
            }
            None => self.lines.push(CartLine {
                product_id: product.id,
                code: product.code.clone(),
                name: product.name.clone(),
                unit_price: product.price,
                quantity,
                available: product.stock,
            }),
        }
        Ok(())
    }

    /// Remove the line for `product_id`; returns whether one existed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total_units(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn total(&self) -> DomainResult<Money> {
        self.lines
            .iter()
            .try_fold(Money::ZERO, |acc, line| acc.checked_add(line.subtotal()?))
    }
}

/// Result of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub sale_id: SaleId,
    pub seller: String,
    pub lines: Vec<CartLine>,
    pub total: Money,
    pub sold_at: DateTime<Utc>,
}
