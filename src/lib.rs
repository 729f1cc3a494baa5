//! # cryptovix: Empirical Option Pricing and a VIX-style Index for Crypto Assets
//!
//! `cryptovix` prices European options on an asset without fitting any
//! distribution: future prices are simulated by bootstrap-resampling the
//! asset's own recent daily returns, and an option's value is the discounted
//! mean payoff over the simulated paths. Strips of those empirical prices feed
//! a CBOE-style variance formula, producing a daily volatility index series.
//!
//! ## Core Features
//!
//! - **Bootstrap Simulation**: sliding-window resampling of historical daily returns
//! - **Empirical Pricing**: discounted mean payoff, simple-interest discounting
//! - **Volatility Index**: near/next option strips combined into `100 * sqrt(total variance)`
//! - **Series Runs**: deterministic sequential runs or per-date seeded parallel runs
//! - **Backtesting**: daily-rebalanced multi-asset portfolio walker
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cryptovix::{compute_index_series, default_configs, load};
//!
//! let series = load("BTC", "data/BTC_price.csv")?;
//! let config = default_configs::fast();
//!
//! let vix = compute_index_series(&series, &config)?;
//! for sample in vix.samples() {
//!     println!("{} {:.2}", sample.date, sample.value);
//! }
//! vix.write_csv("BTC_vix.csv")?;
//! # Ok::<(), cryptovix::VixError>(())
//! ```
//!
//! ## Limitations
//!
//! Calls and puts are priced independently from finite samples, so put/call
//! parity only holds up to Monte Carlo noise. With [`SamplingMode::Shared`]
//! each strike's call and put come from the same ensemble and parity holds
//! exactly. The index does not interpolate to a constant 30-day maturity.
//!
//! ## Configuration Presets
//!
//! - `reference()`: 4 repeats of 100 paths, fresh ensemble per quote
//! - `fast()`: shared ensembles for development
//! - `research()`: large ensembles for lower noise
//! - `minimal()`: quick validation settings

// ================================================================================================
// MODULES
// ================================================================================================

pub mod backtest;
pub mod data;
pub mod engine;
pub mod error;
pub mod models;
pub mod plot;

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

// Errors
pub use error::{Result, VixError};

// Price data
pub use data::{load, load_assets, PriceSeries};

// Configuration and result types
pub use engine::{
    config::{linspace, SamplingMode, TermConfig, VixConfig},
    pipeline::{compute_index_series, date_seed, evaluation_dates, SeriesRun},
    types::{
        AtmStrike, IndexComponents, IndexEstimate, OptionQuote, OptionStrip, OptionType,
        StripRow, TermEstimate, VixSample, VixSeries,
    },
};

#[cfg(feature = "parallel")]
pub use engine::pipeline::compute_index_series_parallel;

// Simulation, pricing and index
pub use models::bootstrap::{simulate_paths, BootstrapSimulator, PathEnsemble, SimulatedPath};
pub use models::empirical::{discount_factor, price_from_terminals, price_option, DAYS_PER_YEAR};
pub use models::vix::{build_strip, build_term_strip, compute_index};

pub use backtest::Portfolio;

// ================================================================================================
// DEFAULT CONFIGURATIONS
// ================================================================================================

/// Pre-configured index settings for common use cases.
///
/// # Available Configurations
///
/// - [`reference()`]: the reference construction
/// - [`fast()`]: development settings
/// - [`research()`]: low-noise settings
/// - [`minimal()`]: smoke-test settings
pub mod default_configs {
    use crate::engine::config::VixConfig;

    /// The reference construction.
    ///
    /// **Characteristics:**
    /// - 4 repeats averaged per date
    /// - 100 paths per ensemble
    /// - Fresh ensemble for every strike and option type
    /// - Zero discount rate, seed 109
    ///
    /// # Example
    ///
    /// ```rust
    /// use cryptovix::default_configs;
    ///
    /// let config = default_configs::reference();
    /// assert_eq!(config.repeats, 4);
    /// ```
    pub fn reference() -> VixConfig {
        VixConfig::reference()
    }

    /// Development settings.
    ///
    /// **Characteristics:**
    /// - 2 repeats of 50 paths
    /// - One shared ensemble per maturity
    ///
    /// **Use Cases:**
    /// - Iterating on data files
    /// - Integration testing
    pub fn fast() -> VixConfig {
        VixConfig::fast()
    }

    /// Low-noise settings for research.
    ///
    /// **Characteristics:**
    /// - 16 repeats of 1,000 paths
    /// - Fresh ensemble per quote, as in the reference
    ///
    /// Roughly 160 times the work of [`reference()`] per date.
    pub fn research() -> VixConfig {
        VixConfig::research()
    }

    /// Single repeat of 20 shared paths. Only useful to check that a data
    /// file runs end to end.
    pub fn minimal() -> VixConfig {
        VixConfig::minimal()
    }
}
