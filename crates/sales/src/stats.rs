//! Sales statistics over journal entries.

use core::str::FromStr;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pharmastock_core::time::local_day;
use pharmastock_core::{DomainError, Money};
use pharmastock_inventory::{JournalEntry, MovementKind};

/// Percentage change beyond which the trend counts as up or down.
const TREND_THRESHOLD_PCT: f64 = 5.0;

/// How many products the least-popular ranking keeps.
const LEAST_POPULAR_LIMIT: usize = 10;

/// Which movements the statistics consider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Sales,
    Purchases,
}

impl KindFilter {
    pub fn accepts(&self, kind: MovementKind) -> bool {
        match self {
            Self::All => true,
            Self::Sales => kind == MovementKind::Sale,
            Self::Purchases => kind == MovementKind::Purchase,
        }
    }
}

impl FromStr for KindFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "todos" => Ok(Self::All),
            "sale" | "sales" | "venta" | "ventas" => Ok(Self::Sales),
            "purchase" | "purchases" | "compra" | "compras" => Ok(Self::Purchases),
            other => Err(DomainError::validation(format!("unknown movement kind filter '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUnits {
    pub name: String,
    pub units: i64,
}

/// Direction of daily unit totals, comparing the recent half of the days
/// against the earlier half.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "direction", content = "percent", rename_all = "snake_case")]
pub enum Trend {
    InsufficientData,
    /// `None` when the earlier half sold nothing.
    Up(Option<f64>),
    Down(f64),
    Flat(f64),
}

impl core::fmt::Display for Trend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InsufficientData => f.write_str("insufficient data"),
            Self::Up(None) => f.write_str("up"),
            Self::Up(Some(pct)) => write!(f, "up +{pct:.1}%"),
            Self::Down(pct) => write!(f, "down {pct:.1}%"),
            Self::Flat(pct) => write!(f, "flat {pct:.1}%"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_movements: usize,
    pub total_units: i64,
    pub top_product: Option<ProductUnits>,
    /// Mean of quantity times unit price, unpriced movements counting as zero.
    pub average_value: Money,
    pub movements_today: usize,
    pub trend: Trend,
    /// Smallest positive unit totals, ascending.
    pub least_popular: Vec<ProductUnits>,
}

/// Summarize the entries `kind` accepts. Days are local calendar days.
pub fn summarize(entries: &[JournalEntry], kind: KindFilter, today: NaiveDate) -> SalesSummary {
    let selected: Vec<&JournalEntry> = entries
        .iter()
        .filter(|e| kind.accepts(e.movement.kind))
        .collect();

    let mut per_product: HashMap<&str, i64> = HashMap::new();
    let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    let mut value_cents: i128 = 0;
    let mut movements_today = 0;

    for e in &selected {
        let m = &e.movement;
        *per_product.entry(e.product_name.as_str()).or_default() += m.quantity;
        let day = local_day(m.occurred_at);
        *per_day.entry(day).or_default() += m.quantity;
        value_cents += i128::from(m.value().cents());
        if day == today {
            movements_today += 1;
        }
    }

    let mut ranked: Vec<ProductUnits> = per_product
        .into_iter()
        .map(|(name, units)| ProductUnits {
            name: name.to_string(),
            units,
        })
        .collect();
    ranked.sort_by(|a, b| a.units.cmp(&b.units).then_with(|| a.name.cmp(&b.name)));

    let top_product = ranked
        .iter()
        .max_by(|a, b| a.units.cmp(&b.units).then_with(|| b.name.cmp(&a.name)))
        .cloned();

    let least_popular = ranked
        .iter()
        .filter(|p| p.units > 0)
        .take(LEAST_POPULAR_LIMIT)
        .cloned()
        .collect();

    let average_value = if selected.is_empty() {
        Money::ZERO
    } else {
        let mean = (value_cents as f64 / selected.len() as f64).round() as i64;
        Money::from_cents(mean).unwrap_or(Money::ZERO)
    };

    SalesSummary {
        total_movements: selected.len(),
        total_units: selected.iter().map(|e| e.movement.quantity).sum(),
        top_product,
        average_value,
        movements_today,
        trend: trend(&per_day.into_values().collect::<Vec<_>>()),
        least_popular,
    }
}

/// Trend over chronologically ordered daily totals.
pub fn trend(daily_units: &[i64]) -> Trend {
    if daily_units.len() < 2 {
        return Trend::InsufficientData;
    }

    let half = (daily_units.len() / 2).max(1);
    let mean = |days: &[i64]| days.iter().sum::<i64>() as f64 / days.len() as f64;
    let earlier = mean(&daily_units[..half]);
    let recent = mean(&daily_units[daily_units.len() - half..]);

    if earlier == 0.0 {
        return Trend::Up(None);
    }

    let change = (recent - earlier) / earlier * 100.0;
    if change > TREND_THRESHOLD_PCT {
        Trend::Up(Some(change))
    } else if change < -TREND_THRESHOLD_PCT {
        Trend::Down(change)
    } else {
        Trend::Flat(change)
    }
}
