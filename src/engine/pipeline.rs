use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::data::PriceSeries;
use crate::engine::config::VixConfig;
use crate::engine::types::{IndexEstimate, VixSeries};
use crate::error::{Result, VixError};
use crate::models::vix::compute_index;

/// Dates with enough history for both maturities, oldest first.
///
/// The oldest `config.first_evaluable_row()` rows are skipped.
pub fn evaluation_dates(series: &PriceSeries, config: &VixConfig) -> Vec<NaiveDate> {
    series
        .dates()
        .iter()
        .skip(config.first_evaluable_row())
        .copied()
        .collect()
}

/// Seed of the per-date generator used by parallel runs.
pub fn date_seed(seed: u64, date: NaiveDate) -> u64 {
    seed ^ (date.num_days_from_ce() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// An index series computation over one price series.
pub struct SeriesRun<'a> {
    series: &'a PriceSeries,
    config: &'a VixConfig,
    dates: Option<Vec<NaiveDate>>,
}

impl<'a> SeriesRun<'a> {
    pub fn new(series: &'a PriceSeries, config: &'a VixConfig) -> Self {
        Self {
            series,
            config,
            dates: None,
        }
    }

    /// Restrict the run to `dates` instead of every evaluable date.
    pub fn with_dates(mut self, mut dates: Vec<NaiveDate>) -> Self {
        dates.sort_unstable();
        dates.dedup();
        self.dates = Some(dates);
        self
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        match &self.dates {
            Some(dates) => dates.clone(),
            None => evaluation_dates(self.series, self.config),
        }
    }

    /// Evaluate dates in ascending order with one generator seeded from
    /// `config.seed`. The first fatal error stops the run.
    pub fn run(&self) -> Result<VixSeries> {
        self.config.validate()?;
        let dates = self.dates();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.log_start(dates.len(), false);

        let mut out = VixSeries::default();
        for date in dates {
            match compute_index(self.series, date, self.config, &mut rng) {
                Ok(estimate) => out.push(estimate.sample()),
                Err(source) => return Err(interrupted(date, out, source)),
            }
        }

        self.log_finish(&out);
        Ok(out)
    }

    /// Evaluate dates on the rayon pool, each with a generator seeded from
    /// [`date_seed`]. Output does not depend on scheduling. On failure the
    /// earliest failing date is reported with the samples before it.
    #[cfg(feature = "parallel")]
    pub fn run_parallel(&self) -> Result<VixSeries> {
        use rayon::prelude::*;

        self.config.validate()?;
        let dates = self.dates();
        self.log_start(dates.len(), true);

        let results: Vec<(NaiveDate, Result<IndexEstimate>)> = dates
            .par_iter()
            .map(|&date| (date, self.estimate_seeded(date)))
            .collect();

        let mut out = VixSeries::default();
        for (date, result) in results {
            match result {
                Ok(estimate) => out.push(estimate.sample()),
                Err(source) => return Err(interrupted(date, out, source)),
            }
        }

        self.log_finish(&out);
        Ok(out)
    }

    /// Estimate for one date exactly as a parallel run computes it.
    pub fn estimate_seeded(&self, date: NaiveDate) -> Result<IndexEstimate> {
        let mut rng = StdRng::seed_from_u64(date_seed(self.config.seed, date));
        compute_index(self.series, date, self.config, &mut rng)
    }

    fn log_start(&self, dates: usize, parallel: bool) {
        tracing::info!(
            asset = self.series.name(),
            dates,
            repeats = self.config.repeats,
            paths = self.config.path_count,
            parallel,
            "index series started"
        );
    }

    fn log_finish(&self, out: &VixSeries) {
        let undefined = out.values().iter().filter(|v| !v.is_finite()).count();
        tracing::info!(
            asset = self.series.name(),
            samples = out.len(),
            undefined,
            "index series finished"
        );
    }
}

fn interrupted(date: NaiveDate, completed: VixSeries, source: VixError) -> VixError {
    tracing::warn!(%date, completed = completed.len(), error = %source, "index series interrupted");
    VixError::SeriesInterrupted {
        date,
        completed,
        source: Box::new(source),
    }
}

/// Index value for every evaluable date of `series`, sequentially.
pub fn compute_index_series(series: &PriceSeries, config: &VixConfig) -> Result<VixSeries> {
    SeriesRun::new(series, config).run()
}

/// Parallel counterpart of [`compute_index_series`].
#[cfg(feature = "parallel")]
pub fn compute_index_series_parallel(
    series: &PriceSeries,
    config: &VixConfig,
) -> Result<VixSeries> {
    SeriesRun::new(series, config).run_parallel()
}
