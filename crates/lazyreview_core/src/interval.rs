//! Review interval parsing and calendar offset math.
//!
//! # Responsibility
//! - Parse compact interval tokens (`nn` + `b|d|w|m|q|y`).
//! - Compute forward offsets from a base calendar day.
//!
//! # Invariants
//! - All math is done on `NaiveDate`; no time-of-day is ever introduced.
//! - Offsets are forward only; a positive quantity always yields a later day.
//! - Month-based units clamp the day-of-month (Jan 31 + 1m = Feb 28/29).
//! - Business days skip Saturday/Sunday only; there is no holiday calendar.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static INTERVAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+)([bdwmqy])$").expect("valid interval regex"));

/// Interval parsing/application error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    /// Token does not match `nn[bdwmqy]`.
    InvalidFormat(String),
    /// Result falls outside the representable calendar range.
    OutOfRange { interval: String, base: NaiveDate },
}

impl Display for IntervalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(value) => write!(
                f,
                "invalid interval format `{value}`; expected nn followed by one of b|d|w|m|q|y"
            ),
            Self::OutOfRange { interval, base } => {
                write!(f, "interval `{interval}` from {base} is out of calendar range")
            }
        }
    }
}

impl Error for IntervalError {}

/// Unit letter of an interval token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    /// `b`: Monday–Friday only.
    BusinessDay,
    /// `d`
    Day,
    /// `w`
    Week,
    /// `m`
    Month,
    /// `q`: three calendar months.
    Quarter,
    /// `y`
    Year,
}

impl IntervalUnit {
    fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'b' => Some(Self::BusinessDay),
            'd' => Some(Self::Day),
            'w' => Some(Self::Week),
            'm' => Some(Self::Month),
            'q' => Some(Self::Quarter),
            'y' => Some(Self::Year),
            _ => None,
        }
    }

    /// Canonical lowercase token letter.
    pub fn letter(self) -> char {
        match self {
            Self::BusinessDay => 'b',
            Self::Day => 'd',
            Self::Week => 'w',
            Self::Month => 'm',
            Self::Quarter => 'q',
            Self::Year => 'y',
        }
    }
}

/// Parsed review interval, e.g. `2w`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub quantity: u32,
    pub unit: IntervalUnit,
}

impl FromStr for Interval {
    type Err = IntervalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let invalid = || IntervalError::InvalidFormat(value.to_string());
        let caps = INTERVAL_RE.captures(trimmed).ok_or_else(invalid)?;
        let quantity = caps[1].parse::<u32>().map_err(|_| invalid())?;
        let unit = caps[2]
            .chars()
            .next()
            .and_then(IntervalUnit::from_letter)
            .ok_or_else(invalid)?;
        Ok(Self { quantity, unit })
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.quantity, self.unit.letter())
    }
}

impl Interval {
    /// Returns `base` moved forward by this interval.
    pub fn apply(&self, base: NaiveDate) -> Result<NaiveDate, IntervalError> {
        let out_of_range = || IntervalError::OutOfRange {
            interval: self.to_string(),
            base,
        };
        let quantity = self.quantity;
        let shifted = match self.unit {
            IntervalUnit::BusinessDay => add_business_days(base, quantity),
            IntervalUnit::Day => base.checked_add_days(Days::new(u64::from(quantity))),
            IntervalUnit::Week => base.checked_add_days(Days::new(u64::from(quantity) * 7)),
            IntervalUnit::Month => base.checked_add_months(Months::new(quantity)),
            IntervalUnit::Quarter => quantity
                .checked_mul(3)
                .and_then(|months| base.checked_add_months(Months::new(months))),
            IntervalUnit::Year => quantity
                .checked_mul(12)
                .and_then(|months| base.checked_add_months(Months::new(months))),
        };
        shifted.ok_or_else(out_of_range)
    }
}

fn add_business_days(base: NaiveDate, quantity: u32) -> Option<NaiveDate> {
    if quantity == 0 {
        return Some(base);
    }
    // Counting from a weekend matches counting from the Friday before it.
    let anchor = match base.weekday() {
        Weekday::Sat => base.checked_sub_days(Days::new(1))?,
        Weekday::Sun => base.checked_sub_days(Days::new(2))?,
        _ => base,
    };
    let mut current = anchor.checked_add_days(Days::new(u64::from(quantity / 5) * 7))?;
    let mut remaining = quantity % 5;
    while remaining > 0 {
        current = current.succ_opt()?;
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            remaining -= 1;
        }
    }
    Some(current)
}

/// Returns `base` offset by an interval token such as `3b` or `1q`.
///
/// # Errors
/// - `InvalidFormat` when `interval` is not `nn[bdwmqy]` (case-insensitive).
/// - `OutOfRange` when the result cannot be represented.
pub fn offset_date(base: NaiveDate, interval: &str) -> Result<NaiveDate, IntervalError> {
    interval.parse::<Interval>()?.apply(base)
}

/// Next review day: `today` when never reviewed, otherwise last review + interval.
///
/// The interval is validated in both cases so a broken token is reported even
/// for notes that were never reviewed.
pub fn calc_next_review_date(
    last_reviewed: Option<NaiveDate>,
    interval: &str,
    today: NaiveDate,
) -> Result<NaiveDate, IntervalError> {
    let parsed = interval.parse::<Interval>()?;
    match last_reviewed {
        Some(reviewed) => parsed.apply(reviewed),
        None => Ok(today),
    }
}

/// Whole days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}
