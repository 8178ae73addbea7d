//! Stock consistency audit.
//!
//! The store gathers per-product figures; this module decides which of them
//! are inconsistent.

use serde::{Deserialize, Serialize};

/// Stock-related figures for one live product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockFigures {
    pub code: String,
    pub stock: i64,
    /// Sum of lot quantities, `None` when the product has no lots.
    pub lot_total: Option<i64>,
    /// Net of all movements, `None` when the product has no movements.
    pub movement_net: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockDiscrepancy {
    NegativeStock {
        code: String,
        stock: i64,
    },
    LotMismatch {
        code: String,
        stock: i64,
        lot_total: i64,
    },
    UnexplainedStock {
        code: String,
        stock: i64,
        movement_net: i64,
    },
}

impl StockDiscrepancy {
    pub fn code(&self) -> &str {
        match self {
            Self::NegativeStock { code, .. }
            | Self::LotMismatch { code, .. }
            | Self::UnexplainedStock { code, .. } => code,
        }
    }
}

impl core::fmt::Display for StockDiscrepancy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NegativeStock { code, stock } => write!(f, "{code}: negative stock {stock}"),
            Self::LotMismatch {
                code,
                stock,
                lot_total,
            } => write!(f, "{code}: stock {stock} differs from lot total {lot_total}"),
            Self::UnexplainedStock {
                code,
                stock,
                movement_net,
            } => write!(
                f,
                "{code}: stock {stock} is not explained by movements (net {movement_net})"
            ),
        }
    }
}

/// All discrepancies, in input order; one product may yield several.
pub fn find_discrepancies(figures: &[StockFigures]) -> Vec<StockDiscrepancy> {
    let mut found = Vec::new();
    for f in figures {
        if f.stock < 0 {
            found.push(StockDiscrepancy::NegativeStock {
                code: f.code.clone(),
                stock: f.stock,
            });
        }
        if let Some(lot_total) = f.lot_total.filter(|total| *total != f.stock) {
            found.push(StockDiscrepancy::LotMismatch {
                code: f.code.clone(),
                stock: f.stock,
                lot_total,
            });
        }
        if let Some(movement_net) = f.movement_net.filter(|net| *net != f.stock) {
            found.push(StockDiscrepancy::UnexplainedStock {
                code: f.code.clone(),
                stock: f.stock,
                movement_net,
            });
        }
    }
    found
}
