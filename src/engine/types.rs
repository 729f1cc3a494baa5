use chrono::NaiveDate;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, VixError};

/// Option type priced by the empirical pricer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Intrinsic value at `terminal` for strike `strike`.
    #[inline]
    pub fn payoff(self, terminal: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (terminal - strike).max(0.0),
            OptionType::Put => (strike - terminal).max(0.0),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => f.write_str("call"),
            OptionType::Put => f.write_str("put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = VixError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            _ => Err(VixError::InvalidInput(format!("invalid option type: {s}"))),
        }
    }
}

/// One priced contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionQuote {
    pub strike: f64,
    pub option_type: OptionType,
    pub price: f64,
}

/// Call and put price at one strike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripRow {
    pub strike: f64,
    pub call: f64,
    pub put: f64,
}

/// Call/put prices across an evenly spaced strike grid for one maturity.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionStrip {
    /// Days from the evaluation date to expiry.
    pub horizon_days: u32,
    /// Spot close on the evaluation date.
    pub spot: f64,
    rows: Vec<StripRow>,
}

impl OptionStrip {
    /// Rows are kept sorted by strike.
    pub fn new(horizon_days: u32, spot: f64, mut rows: Vec<StripRow>) -> Self {
        rows.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        Self {
            horizon_days,
            spot,
            rows,
        }
    }

    pub fn rows(&self) -> &[StripRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn strikes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.strike).collect()
    }

    /// Row at exactly `strike`.
    pub fn get(&self, strike: f64) -> Option<&StripRow> {
        self.rows.iter().find(|r| r.strike == strike)
    }

    /// Distance between adjacent strikes. The grid is evenly spaced, so the
    /// first pair is representative.
    pub fn spacing(&self) -> Option<f64> {
        match self.rows.as_slice() {
            [first, second, ..] => Some((second.strike - first.strike).abs()),
            _ => None,
        }
    }

    /// Flatten into individual call and put quotes, strike-ascending.
    pub fn quotes(&self) -> Vec<OptionQuote> {
        self.rows
            .iter()
            .flat_map(|r| {
                [
                    OptionQuote {
                        strike: r.strike,
                        option_type: OptionType::Call,
                        price: r.call,
                    },
                    OptionQuote {
                        strike: r.strike,
                        option_type: OptionType::Put,
                        price: r.put,
                    },
                ]
            })
            .collect()
    }
}

/// Result of the at-the-money-adjacent strike search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AtmStrike {
    /// A grid strike on the requested side of the closest strike.
    Adjacent(f64),
    /// No grid strike on that side; the closest strike itself is used.
    Fallback(f64),
}

impl AtmStrike {
    pub fn strike(self) -> f64 {
        match self {
            AtmStrike::Adjacent(k) | AtmStrike::Fallback(k) => k,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, AtmStrike::Fallback(_))
    }
}

/// Intermediate quantities of one maturity's variance estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermEstimate {
    pub horizon_days: u32,
    /// Maturity in years (`horizon_days / 365`).
    pub year_fraction: f64,
    /// Strike where `|call - put|` is smallest.
    pub closest_strike: f64,
    /// Synthetic forward backed out at the closest strike.
    pub forward: f64,
    pub k0_call: AtmStrike,
    pub k0_put: AtmStrike,
    /// Half the grid spacing.
    pub delta: f64,
    /// `sum put/K^2` below `k0_put` plus `sum call/K^2` above `k0_call`.
    pub strike_sum: f64,
    pub variance: f64,
}

/// One Monte Carlo repeat of the index computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexComponents {
    pub near: TermEstimate,
    pub next: TermEstimate,
    /// `T_near * var_near + T_next * var_next` before any flooring.
    pub total_variance: f64,
    /// Set when a negative total was floored to zero.
    pub floored: bool,
    pub value: f64,
}

/// Index value for one date plus the repeats it was averaged from.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEstimate {
    pub date: NaiveDate,
    /// Mean of finite repeat values, NaN when none were finite.
    pub value: f64,
    pub repeats: Vec<IndexComponents>,
    pub finite_repeats: usize,
}

impl IndexEstimate {
    pub fn sample(&self) -> VixSample {
        VixSample {
            date: self.date,
            value: self.value,
            finite_repeats: self.finite_repeats,
            total_repeats: self.repeats.len(),
        }
    }
}

/// One point of the volatility index series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VixSample {
    pub date: NaiveDate,
    pub value: f64,
    pub finite_repeats: usize,
    pub total_repeats: usize,
}

/// Index samples ordered by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VixSeries {
    samples: Vec<VixSample>,
}

impl VixSeries {
    /// Build from samples in any order; the series is sorted by date.
    pub fn from_samples(mut samples: Vec<VixSample>) -> Self {
        samples.sort_by_key(|s| s.date);
        Self { samples }
    }

    pub(crate) fn push(&mut self, sample: VixSample) {
        debug_assert!(self.samples.last().map_or(true, |last| last.date < sample.date));
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[VixSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.samples.iter().map(|s| s.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.samples
            .binary_search_by_key(&date, |s| s.date)
            .ok()
            .map(|i| self.samples[i].value)
    }

    /// Write `date,vix` rows with a header line.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer =
            csv::Writer::from_path(path).map_err(|e| VixError::data_load(path, e.to_string()))?;
        writer
            .write_record(["date", "vix"])
            .map_err(|e| VixError::data_load(path, e.to_string()))?;
        for sample in &self.samples {
            writer
                .write_record([sample.date.to_string(), sample.value.to_string()])
                .map_err(|e| VixError::data_load(path, e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| VixError::data_load(path, e.to_string()))?;
        Ok(())
    }
}
