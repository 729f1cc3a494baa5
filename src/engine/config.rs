use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, VixError};
use crate::models::empirical::DAYS_PER_YEAR;

/// How path ensembles are shared across an option strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Fresh ensemble for every strike and option type.
    #[default]
    PerQuote,
    /// One ensemble per maturity, reused across the whole strike grid.
    Shared,
}

/// Simulation and strike-grid settings for one maturity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermConfig {
    /// Days from evaluation date to expiry.
    pub horizon_days: u32,
    /// Trading days of history each simulated day may draw from.
    pub lookback_days: u32,
    /// Half-width of the strike grid as a fraction of spot (0.1 = ±10%).
    pub band: f64,
    /// Number of evenly spaced strikes.
    pub grid_points: usize,
}

impl TermConfig {
    /// 5-day expiry, 5-day lookback, ±10% over 10 strikes.
    pub fn near() -> Self {
        Self {
            horizon_days: 5,
            lookback_days: 5,
            band: 0.10,
            grid_points: 10,
        }
    }

    /// 30-day expiry, 30-day lookback, ±20% over 20 strikes.
    pub fn next() -> Self {
        Self {
            horizon_days: 30,
            lookback_days: 30,
            band: 0.20,
            grid_points: 20,
        }
    }

    /// Maturity in years on the pricer's day count.
    pub fn year_fraction(&self) -> f64 {
        self.horizon_days as f64 / DAYS_PER_YEAR
    }

    /// Evenly spaced strikes from `spot * (1 - band)` to `spot * (1 + band)`.
    pub fn strike_grid(&self, spot: f64) -> Vec<f64> {
        linspace(spot * (1.0 - self.band), spot * (1.0 + self.band), self.grid_points)
    }

    /// Defined returns a simulation for this term needs before the evaluation date.
    pub fn required_history(&self) -> usize {
        (self.horizon_days + self.lookback_days) as usize
    }

    fn validate(&self, label: &str) -> Result<()> {
        if self.horizon_days == 0 {
            return Err(VixError::Config(format!("{label}.horizon_days must be >= 1")));
        }
        if !self.band.is_finite() || self.band <= 0.0 || self.band >= 1.0 {
            return Err(VixError::Config(format!(
                "{label}.band must be in (0, 1), got {}",
                self.band
            )));
        }
        if self.grid_points < 2 {
            return Err(VixError::Config(format!(
                "{label}.grid_points must be >= 2, got {}",
                self.grid_points
            )));
        }
        Ok(())
    }
}

/// Main configuration for strip building and index computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VixConfig {
    /// Flat annual rate used for discounting and forward carry.
    #[serde(default)]
    pub discount_rate: f64,

    /// Monte Carlo repeats averaged into one index value.
    #[serde(default = "default_repeats")]
    pub repeats: usize,

    /// Paths per simulated ensemble.
    #[serde(default = "default_path_count")]
    pub path_count: usize,

    /// Seed of the generator driving a series run.
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "TermConfig::near")]
    pub near: TermConfig,

    #[serde(default = "TermConfig::next")]
    pub next: TermConfig,

    #[serde(default)]
    pub sampling: SamplingMode,

    /// Report 0 instead of NaN when the combined variance is negative and
    /// neither strip has any out-of-the-money value (a flat history).
    #[serde(default = "default_floor_negative_variance")]
    pub floor_negative_variance: bool,
}

impl Default for VixConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl VixConfig {
    /// Settings of the reference construction: zero rate, 4 repeats of
    /// 100 paths, fresh ensemble per quote, seed 109.
    pub fn reference() -> Self {
        Self {
            discount_rate: 0.0,
            repeats: default_repeats(),
            path_count: default_path_count(),
            seed: default_seed(),
            near: TermConfig::near(),
            next: TermConfig::next(),
            sampling: SamplingMode::PerQuote,
            floor_negative_variance: default_floor_negative_variance(),
        }
    }

    /// Shared ensembles and fewer paths for development runs.
    pub fn fast() -> Self {
        Self {
            repeats: 2,
            path_count: 50,
            sampling: SamplingMode::Shared,
            ..Self::reference()
        }
    }

    /// Many repeats and large ensembles to push Monte Carlo noise down.
    pub fn research() -> Self {
        Self {
            repeats: 16,
            path_count: 1000,
            ..Self::reference()
        }
    }

    /// Single repeat of a small shared ensemble, for smoke tests.
    pub fn minimal() -> Self {
        Self {
            repeats: 1,
            path_count: 20,
            sampling: SamplingMode::Shared,
            ..Self::reference()
        }
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| VixError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.discount_rate.is_finite() {
            return Err(VixError::Config(format!(
                "discount_rate must be finite, got {}",
                self.discount_rate
            )));
        }
        if self.repeats == 0 {
            return Err(VixError::Config("repeats must be >= 1".into()));
        }
        if self.path_count == 0 {
            return Err(VixError::Config("path_count must be >= 1".into()));
        }
        self.near.validate("near")?;
        self.next.validate("next")?;
        Ok(())
    }

    /// Oldest row (0-based, oldest first) for which both maturities can be simulated.
    pub fn first_evaluable_row(&self) -> usize {
        self.near.required_history().max(self.next.required_history()) + 1
    }
}

/// `n` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

fn default_repeats() -> usize {
    4
}

fn default_path_count() -> usize {
    100
}

fn default_seed() -> u64 {
    109
}

fn default_floor_negative_variance() -> bool {
    true
}
