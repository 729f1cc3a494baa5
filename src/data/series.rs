use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

use crate::error::{Result, VixError};

/// Daily close prices of one asset, ordered oldest to newest.
///
/// Built once and read-only afterwards. Lookups by date go through a
/// `date -> row` map, so every query is O(1) and a date can never match twice.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    name: String,
    dates: Vec<NaiveDate>,
    closes: Vec<f64>,
    /// One-day percentage returns; `returns[0]` is NaN (no prior close).
    returns: Vec<f64>,
    rows: HashMap<NaiveDate, usize>,
}

impl PriceSeries {
    /// Build a series from `(date, close)` pairs in any order.
    ///
    /// Rejects empty input, duplicate dates and closes that are not finite and
    /// strictly positive. The last rule keeps every return above -100%, so a
    /// compounded price can never reach zero or flip sign.
    pub fn new(name: impl Into<String>, mut rows: Vec<(NaiveDate, f64)>) -> Result<Self> {
        let name = name.into();
        if rows.is_empty() {
            return Err(VixError::InvalidInput(format!(
                "price series '{name}' has no rows"
            )));
        }

        rows.sort_by_key(|(date, _)| *date);

        let mut dates = Vec::with_capacity(rows.len());
        let mut closes = Vec::with_capacity(rows.len());
        let mut index = HashMap::with_capacity(rows.len());

        for (row, (date, close)) in rows.into_iter().enumerate() {
            if !close.is_finite() || close <= 0.0 {
                return Err(VixError::InvalidInput(format!(
                    "price series '{name}': close on {date} must be positive and finite, got {close}"
                )));
            }
            if index.insert(date, row).is_some() {
                return Err(VixError::InvalidInput(format!(
                    "price series '{name}': duplicate date {date}"
                )));
            }
            dates.push(date);
            closes.push(close);
        }

        let returns = pct_returns(&closes);

        Ok(Self {
            name,
            dates,
            closes,
            returns,
            rows: index,
        })
    }

    /// Series with one close per consecutive calendar day starting at `first_date`.
    /// `closes` run oldest to newest.
    pub fn from_daily_closes(
        name: impl Into<String>,
        first_date: NaiveDate,
        closes: &[f64],
    ) -> Result<Self> {
        let rows = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| (first_date + Duration::days(i as i64), close))
            .collect();
        Self::new(name, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Closes aligned with [`dates`](Self::dates).
    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    /// Returns aligned with [`dates`](Self::dates); the first entry is NaN.
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.rows.contains_key(&date)
    }

    /// Row of `date`, counted from the oldest observation.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.rows.get(&date).copied()
    }

    pub fn close(&self, date: NaiveDate) -> Option<f64> {
        self.position(date).map(|row| self.closes[row])
    }

    /// Percentage return realized on `date`; `None` at the oldest date.
    pub fn pct_return(&self, date: NaiveDate) -> Option<f64> {
        self.position(date)
            .map(|row| self.returns[row])
            .filter(|r| r.is_finite())
    }

    pub(crate) fn row(&self, date: NaiveDate) -> Result<usize> {
        self.position(date).ok_or_else(|| VixError::UnknownDate {
            asset: self.name.clone(),
            date,
        })
    }
}

/// `(close[i] - close[i-1]) / close[i-1]`, NaN for the oldest row.
fn pct_returns(closes: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(closes.len());
    out.push(f64::NAN);
    out.extend(closes.windows(2).map(|w| (w[1] - w[0]) / w[0]));
    out
}
