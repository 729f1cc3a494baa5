//! Error types for the engine.
//!
//! Fatal preconditions (bad input files, missing history) surface as
//! [`VixError`]. Numeric degeneracies inside an estimate are not errors: they are
//! excluded from averages and counted on the result instead.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

use crate::engine::types::VixSeries;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, VixError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VixError {
    /// Input file missing, unreadable or malformed.
    #[error("failed to load {}: {message}", path.display())]
    DataLoad { path: PathBuf, message: String },

    /// The requested date has no row in the price series.
    #[error("date {date} not present in series '{asset}'")]
    UnknownDate { asset: String, date: NaiveDate },

    /// The lookback window reaches past the oldest usable return.
    #[error(
        "insufficient history at {date}: need {required} prior returns, series has {available}"
    )]
    InsufficientHistory {
        date: NaiveDate,
        required: usize,
        available: usize,
    },

    /// Invalid argument (zero horizon, empty grid, non-finite rate, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration failed to parse or validate.
    #[error("config error: {0}")]
    Config(String),

    /// A fatal error inside a series run. `completed` holds every sample
    /// produced before the failing date.
    #[error("index series interrupted at {date}: {source}")]
    SeriesInterrupted {
        date: NaiveDate,
        completed: VixSeries,
        #[source]
        source: Box<VixError>,
    },
}

impl VixError {
    pub(crate) fn data_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        VixError::DataLoad {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for VixError {
    fn from(e: toml::de::Error) -> Self {
        VixError::Config(e.to_string())
    }
}
