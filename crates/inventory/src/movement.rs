//! The append-only movement journal and its search filters.

use core::str::FromStr;

use chrono::{DateTime, Datelike, Days, Local, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use pharmastock_core::time::{day_in, format_timestamp, parse_date, start_of_day_in};
use pharmastock_core::{DomainError, DomainResult, Money, MovementId, SaleId};

use crate::stock::StockAdjustment;

/// Product name shown for movements whose product no longer exists.
pub const UNKNOWN_PRODUCT: &str = "unknown product";

// ─────────────────────────────────────────────────────────────────────────────
// Movements
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Sale,
    Purchase,
    Adjustment,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Purchase => "purchase",
            Self::Adjustment => "adjustment",
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" | "venta" => Ok(Self::Sale),
            "purchase" | "compra" => Ok(Self::Purchase),
            "adjustment" | "ajuste" => Ok(Self::Adjustment),
            other => Err(DomainError::validation(format!("unknown movement kind '{other}'"))),
        }
    }
}

/// A persisted stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub product_code: String,
    pub kind: MovementKind,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub username: Option<String>,
    pub sale_id: Option<SaleId>,
    pub unit_price: Option<Money>,
}

/// Effect of a movement on stock. Adjustments carry their sign in the notes.
pub fn signed_quantity(kind: MovementKind, quantity: i64, notes: Option<&str>) -> i64 {
    match kind {
        MovementKind::Purchase => quantity,
        MovementKind::Sale => -quantity,
        MovementKind::Adjustment => {
            let negative = notes.is_some_and(|n| n.trim_start().starts_with('-'));
            if negative { -quantity } else { quantity }
        }
    }
}

impl Movement {
    pub fn signed_quantity(&self) -> i64 {
        signed_quantity(self.kind, self.quantity, self.notes.as_deref())
    }

    /// Quantity times unit price; movements without a price are worth zero.
    pub fn value(&self) -> Money {
        self.unit_price
            .and_then(|p| p.times(self.quantity).ok())
            .unwrap_or(Money::ZERO)
    }
}

/// A movement with the name of its product, as shown in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub movement: Movement,
    pub product_name: String,
}

/// A movement about to be appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovement {
    pub product_code: String,
    pub kind: MovementKind,
    pub quantity: i64,
    pub notes: Option<String>,
    pub username: Option<String>,
    pub sale_id: Option<SaleId>,
    pub unit_price: Option<Money>,
}

impl NewMovement {
    pub fn purchase(product_code: &str, quantity: i64, lot_code: &str, username: &str) -> Self {
        Self {
            product_code: product_code.to_string(),
            kind: MovementKind::Purchase,
            quantity,
            notes: Some(format!("lot {lot_code} received")),
            username: Some(username.to_string()),
            sale_id: None,
            unit_price: None,
        }
    }

    pub fn sale(
        product_code: &str,
        quantity: i64,
        unit_price: Money,
        sale_id: SaleId,
        seller: &str,
    ) -> Self {
        Self {
            product_code: product_code.to_string(),
            kind: MovementKind::Sale,
            quantity,
            notes: Some(format!("sale recorded by {seller}")),
            username: Some(seller.to_string()),
            sale_id: Some(sale_id),
            unit_price: Some(unit_price),
        }
    }

    pub fn adjustment(
        product_code: &str,
        adjustment: StockAdjustment,
        reason: &str,
        username: &str,
    ) -> Self {
        Self {
            product_code: product_code.to_string(),
            kind: MovementKind::Adjustment,
            quantity: adjustment.quantity(),
            notes: Some(adjustment.notes(reason)),
            username: Some(username.to_string()),
            sale_id: None,
            unit_price: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Filters
// ─────────────────────────────────────────────────────────────────────────────

/// Half-open range of calendar days: `start <= day < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Both ends inclusive.
    pub fn inclusive(first: NaiveDate, last: NaiveDate) -> DomainResult<Self> {
        if last < first {
            return Err(DomainError::validation(format!(
                "range end {last} is before its start {first}"
            )));
        }
        Ok(Self {
            start: first,
            end: next_day(last)?,
        })
    }

    pub fn day(day: NaiveDate) -> DomainResult<Self> {
        Self::inclusive(day, day)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }

    /// Timestamp text bounds `[lower, upper)` of the local days, comparable
    /// with stored timestamps.
    pub fn bounds(&self) -> (String, String) {
        self.bounds_in(&Local)
    }

    pub fn bounds_in<Tz: TimeZone>(&self, tz: &Tz) -> (String, String) {
        (
            format_timestamp(start_of_day_in(self.start, tz)),
            format_timestamp(start_of_day_in(self.end, tz)),
        )
    }
}

fn next_day(day: NaiveDate) -> DomainResult<NaiveDate> {
    day.succ_opt()
        .ok_or_else(|| DomainError::validation(format!("date {day} is out of range")))
}

fn month_start(year: i32, month: u32) -> DomainResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DomainError::validation(format!("invalid month {year}-{month:02}")))
}

fn year_start(year: i32) -> DomainResult<NaiveDate> {
    month_start(year, 1)
}

fn add_months(day: NaiveDate, months: u32) -> DomainResult<NaiveDate> {
    day.checked_add_months(Months::new(months))
        .ok_or_else(|| DomainError::validation(format!("date {day} is out of range")))
}

/// Preset periods relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    Today,
    ThisWeek,
    ThisMonth,
    ThisYear,
    LastWeek,
    LastMonth,
    LastYear,
}

impl Period {
    pub const ALL: [Period; 7] = [
        Period::Today,
        Period::ThisWeek,
        Period::ThisMonth,
        Period::ThisYear,
        Period::LastWeek,
        Period::LastMonth,
        Period::LastYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::ThisWeek => "this-week",
            Self::ThisMonth => "this-month",
            Self::ThisYear => "this-year",
            Self::LastWeek => "last-week",
            Self::LastMonth => "last-month",
            Self::LastYear => "last-year",
        }
    }

    /// Resolve to a day range. Weeks run Monday to Sunday.
    pub fn resolve(&self, today: NaiveDate) -> DomainResult<DateRange> {
        let monday = today
            .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
            .ok_or_else(|| DomainError::validation("date out of range"))?;
        let this_month = month_start(today.year(), today.month())?;
        let this_year = year_start(today.year())?;

        let (start, end) = match self {
            Self::Today => (today, next_day(today)?),
            Self::ThisWeek => (monday, monday + Days::new(7)),
            Self::ThisMonth => (this_month, add_months(this_month, 1)?),
            Self::ThisYear => (this_year, year_start(today.year() + 1)?),
            Self::LastWeek => (monday - Days::new(7), monday),
            Self::LastMonth => (
                this_month
                    .checked_sub_months(Months::new(1))
                    .ok_or_else(|| DomainError::validation("date out of range"))?,
                this_month,
            ),
            Self::LastYear => (year_start(today.year() - 1)?, this_year),
        };
        Ok(DateRange { start, end })
    }
}

impl core::fmt::Display for Period {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| DomainError::validation(format!("unknown period '{s}'")))
    }
}

/// Journal query: an optional day range and an optional text match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFilter {
    pub range: Option<DateRange>,
    /// Substring matched against code, product name, kind, username and notes.
    /// Legacy kind names (`venta`, `compra`, `ajuste`) search for their kind.
    pub text: Option<String>,
}

impl MovementFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn period(period: Period, today: NaiveDate) -> DomainResult<Self> {
        Ok(Self {
            range: Some(period.resolve(today)?),
            text: None,
        })
    }

    /// Interpret free-text search input.
    ///
    /// - `2024-01-01 a 2024-01-31` (or `..`, ` to `): inclusive range
    /// - `2024-01-15`: one day
    /// - `2024-01`: one month
    /// - `2024`: one year
    /// - anything else: text match
    pub fn parse(input: &str) -> DomainResult<Self> {
        let text = input.trim();
        if text.is_empty() {
            return Ok(Self::all());
        }

        let range = if let Some((first, last)) = split_range(text) {
            Some(DateRange::inclusive(parse_date(first)?, parse_date(last)?)?)
        } else if is_shaped(text, &[4, 2, 2]) {
            Some(DateRange::day(parse_date(text)?)?)
        } else if is_shaped(text, &[4, 2]) {
            let (year, month) = text.split_at(4);
            let year = parse_number(year)?;
            let month = parse_number(&month[1..])?;
            let start = month_start(year, u32::try_from(month).unwrap_or(0))?;
            Some(DateRange {
                start,
                end: add_months(start, 1)?,
            })
        } else if is_year(text) {
            let year = parse_number(text)?;
            Some(DateRange {
                start: year_start(year)?,
                end: year_start(year + 1)?,
            })
        } else {
            None
        };

        Ok(match range {
            Some(range) => Self {
                range: Some(range),
                text: None,
            },
            None => Self {
                range: None,
                text: Some(text.to_string()),
            },
        })
    }

    /// Text the journal search looks for, with kind aliases made canonical.
    pub fn needle(&self) -> Option<String> {
        let text = self.text.as_deref()?;
        Some(match text.parse::<MovementKind>() {
            Ok(kind) => kind.as_str().to_string(),
            Err(_) => text.to_string(),
        })
    }

    /// True for entries this filter selects, with days on the local clock;
    /// mirrors the store's SQL.
    pub fn matches(&self, entry: &JournalEntry) -> bool {
        self.matches_in(entry, &Local)
    }

    pub fn matches_in<Tz: TimeZone>(&self, entry: &JournalEntry, tz: &Tz) -> bool {
        let m = &entry.movement;
        let in_range = self
            .range
            .is_none_or(|r| r.contains(day_in(m.occurred_at, tz)));
        let text_ok = self.needle().is_none_or(|needle| {
            let needle = needle.to_lowercase();
            [
                Some(m.product_code.as_str()),
                Some(entry.product_name.as_str()),
                Some(m.kind.as_str()),
                m.username.as_deref(),
                m.notes.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
        });
        in_range && text_ok
    }
}

/// Split `<date> a <date>` style input. Only input starting with a full date
/// counts, so "ibuprofeno a granel" stays a text search.
fn split_range(text: &str) -> Option<(&str, &str)> {
    let lower = text.to_ascii_lowercase();
    [" a ", " to ", ".."]
        .into_iter()
        .find_map(|sep| {
            lower
                .find(sep)
                .map(|at| (text[..at].trim(), text[at + sep.len()..].trim()))
        })
        .filter(|(first, _)| is_shaped(first, &[4, 2, 2]))
}

/// Digit groups separated by `-` with the given lengths.
fn is_shaped(text: &str, groups: &[usize]) -> bool {
    let parts: Vec<&str> = text.split('-').collect();
    parts.len() == groups.len()
        && parts
            .iter()
            .zip(groups)
            .all(|(p, len)| p.len() == *len && p.chars().all(|c| c.is_ascii_digit()))
}

/// Four digits read as a year; `0001`-style product codes stay text.
fn is_year(text: &str) -> bool {
    is_shaped(text, &[4]) && !text.starts_with('0')
}

fn parse_number(text: &str) -> DomainResult<i32> {
    text.parse::<i32>()
        .map_err(|e| DomainError::validation(format!("invalid number '{text}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(kind: MovementKind, notes: Option<&str>, at: DateTime<Utc>) -> JournalEntry {
        JournalEntry {
            movement: Movement {
                id: MovementId::new(1),
                product_code: "0001".to_string(),
                kind,
                quantity: 3,
                occurred_at: at,
                notes: notes.map(str::to_string),
                username: Some("Ana Quispe".to_string()),
                sale_id: None,
                unit_price: Some(Money::from_cents(250).unwrap()),
            },
            product_name: "Ibuprofeno".to_string(),
        }
    }

    #[test]
    fn kinds_accept_legacy_aliases() {
        assert_eq!("venta".parse::<MovementKind>().unwrap(), MovementKind::Sale);
        assert_eq!("Compra".parse::<MovementKind>().unwrap(), MovementKind::Purchase);
        assert!("robo".parse::<MovementKind>().is_err());
    }

    #[test]
    fn signed_quantity_follows_kind_and_note_sign() {
        let at = Utc::now();
        assert_eq!(entry(MovementKind::Sale, None, at).movement.signed_quantity(), -3);
        assert_eq!(entry(MovementKind::Purchase, None, at).movement.signed_quantity(), 3);
        assert_eq!(
            entry(MovementKind::Adjustment, Some("-3 broken"), at).movement.signed_quantity(),
            -3
        );
        assert_eq!(
            entry(MovementKind::Adjustment, Some("+3 recount"), at).movement.signed_quantity(),
            3
        );
    }

    #[test]
    fn value_is_quantity_times_price() {
        let e = entry(MovementKind::Sale, None, Utc::now());
        assert_eq!(e.movement.value().cents(), 750);
    }

    #[test]
    fn parse_date_range_in_all_spellings() {
        let expected = DateRange {
            start: date(2024, 1, 1),
            end: date(2024, 2, 1),
        };
        for input in [
            "2024-01-01 a 2024-01-31",
            "2024-01-01 A 2024-01-31",
            "2024-01-01..2024-01-31",
            "2024-01-01 to 2024-01-31",
        ] {
            assert_eq!(MovementFilter::parse(input).unwrap().range, Some(expected), "{input}");
        }
    }

    #[test]
    fn parse_day_month_and_year() {
        let day = MovementFilter::parse("2024-02-29").unwrap();
        assert_eq!(day.range, Some(DateRange::day(date(2024, 2, 29)).unwrap()));

        let month = MovementFilter::parse("2024-12").unwrap().range.unwrap();
        assert_eq!((month.start, month.end), (date(2024, 12, 1), date(2025, 1, 1)));

        let year = MovementFilter::parse("2023").unwrap().range.unwrap();
        assert_eq!((year.start, year.end), (date(2023, 1, 1), date(2024, 1, 1)));
    }

    #[test]
    fn parse_rejects_malformed_dates() {
        for bad in ["2024-13", "2024-02-30", "2024-01-31 a 2024-01-01", "2024-01-01 a mañana"] {
            match MovementFilter::parse(bad) {
                Err(DomainError::Validation(_)) => {}
                other => panic!("expected validation error for '{bad}', got {other:?}"),
            }
        }
    }

    #[test]
    fn other_input_is_text_search() {
        let f = MovementFilter::parse("  ibupro ").unwrap();
        assert_eq!(f.text.as_deref(), Some("ibupro"));
        assert_eq!(f.range, None);

        let code = MovementFilter::parse("0001").unwrap();
        assert_eq!(code.text.as_deref(), Some("0001"));

        let phrase = MovementFilter::parse("ibuprofeno a granel").unwrap();
        assert_eq!(phrase.text.as_deref(), Some("ibuprofeno a granel"));

        assert_eq!(MovementFilter::parse("   ").unwrap(), MovementFilter::all());
    }

    #[test]
    fn periods_resolve_relative_to_today() {
        // Thursday
        let today = date(2024, 3, 14);
        let r = |p: Period| p.resolve(today).unwrap();

        assert_eq!(r(Period::Today), DateRange::day(today).unwrap());
        assert_eq!((r(Period::ThisWeek).start, r(Period::ThisWeek).end), (date(2024, 3, 11), date(2024, 3, 18)));
        assert_eq!((r(Period::LastWeek).start, r(Period::LastWeek).end), (date(2024, 3, 4), date(2024, 3, 11)));
        assert_eq!((r(Period::ThisMonth).start, r(Period::ThisMonth).end), (date(2024, 3, 1), date(2024, 4, 1)));
        assert_eq!((r(Period::LastMonth).start, r(Period::LastMonth).end), (date(2024, 2, 1), date(2024, 3, 1)));
        assert_eq!((r(Period::ThisYear).start, r(Period::ThisYear).end), (date(2024, 1, 1), date(2025, 1, 1)));
        assert_eq!((r(Period::LastYear).start, r(Period::LastYear).end), (date(2023, 1, 1), date(2024, 1, 1)));
    }

    #[test]
    fn last_month_wraps_the_year() {
        let range = Period::LastMonth.resolve(date(2024, 1, 20)).unwrap();
        assert_eq!((range.start, range.end), (date(2023, 12, 1), date(2024, 1, 1)));
    }

    #[test]
    fn period_names_parse() {
        assert_eq!("this_week".parse::<Period>().unwrap(), Period::ThisWeek);
        assert_eq!("Last-Year".parse::<Period>().unwrap(), Period::LastYear);
        assert!("fortnight".parse::<Period>().is_err());
    }

    #[test]
    fn bounds_are_timestamp_text() {
        let range = DateRange::inclusive(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(
            range.bounds_in(&Utc),
            ("2024-01-01 00:00:00".to_string(), "2024-02-01 00:00:00".to_string())
        );

        let la_paz = FixedOffset::west_opt(4 * 3600).unwrap();
        assert_eq!(
            range.bounds_in(&la_paz),
            ("2024-01-01 04:00:00".to_string(), "2024-02-01 04:00:00".to_string())
        );
    }

    #[test]
    fn matches_checks_range_and_text() {
        let at = Utc.with_ymd_and_hms(2024, 3, 14, 23, 59, 59).unwrap();
        let e = entry(MovementKind::Sale, Some("sale recorded by Ana Quispe"), at);

        assert!(MovementFilter::parse("2024-03-14").unwrap().matches_in(&e, &Utc));
        assert!(!MovementFilter::parse("2024-03-15").unwrap().matches_in(&e, &Utc));
        assert!(MovementFilter::parse("IBUPRO").unwrap().matches_in(&e, &Utc));
        assert!(MovementFilter::parse("quispe").unwrap().matches_in(&e, &Utc));
        assert!(!MovementFilter::parse("paracetamol").unwrap().matches_in(&e, &Utc));
    }

    #[test]
    fn day_search_uses_the_local_day() {
        // 21:00 on the 14th in UTC-4
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 1, 0, 0).unwrap();
        let e = entry(MovementKind::Sale, None, at);
        let la_paz = FixedOffset::west_opt(4 * 3600).unwrap();

        assert!(MovementFilter::parse("2024-03-14").unwrap().matches_in(&e, &la_paz));
        assert!(!MovementFilter::parse("2024-03-15").unwrap().matches_in(&e, &la_paz));
    }

    #[test]
    fn legacy_kind_names_search_the_kind() {
        let at = Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap();
        let sale = entry(MovementKind::Sale, None, at);
        let purchase = entry(MovementKind::Purchase, None, at);

        let venta = MovementFilter::parse("Venta").unwrap();
        assert_eq!(venta.needle().as_deref(), Some("sale"));
        assert!(venta.matches_in(&sale, &Utc));
        assert!(!venta.matches_in(&purchase, &Utc));

        let compra = MovementFilter::parse("compra").unwrap();
        assert!(compra.matches_in(&purchase, &Utc));
        assert_eq!(MovementFilter::parse("ibupro").unwrap().needle().as_deref(), Some("ibupro"));
    }
}
