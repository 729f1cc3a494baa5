use chrono::{Duration, NaiveDate};
use rand::Rng;

use crate::data::PriceSeries;
use crate::engine::config::TermConfig;
use crate::error::{Result, VixError};

/// Synthetic prices for `start_date + 1 ..= start_date + horizon`, ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPath {
    prices: Vec<f64>,
}

impl SimulatedPath {
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Price on the last simulated day.
    pub fn terminal(&self) -> f64 {
        self.prices.last().copied().unwrap_or(f64::NAN)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Independently resampled paths sharing a start date and spot price.
/// Every path has exactly `horizon_days` prices.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEnsemble {
    start_date: NaiveDate,
    spot: f64,
    horizon_days: u32,
    lookback_days: u32,
    paths: Vec<SimulatedPath>,
}

impl PathEnsemble {
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[SimulatedPath] {
        &self.paths
    }

    /// Path by 1-based index.
    pub fn path(&self, index: usize) -> Option<&SimulatedPath> {
        index.checked_sub(1).and_then(|i| self.paths.get(i))
    }

    /// `(index, path)` pairs with 1-based indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &SimulatedPath)> {
        self.paths.iter().enumerate().map(|(i, p)| (i + 1, p))
    }

    /// Calendar dates labelling each simulated price.
    pub fn dates(&self) -> Vec<NaiveDate> {
        (1..=self.horizon_days as i64)
            .map(|d| self.start_date + Duration::days(d))
            .collect()
    }

    pub fn terminals(&self) -> Vec<f64> {
        self.paths.iter().map(SimulatedPath::terminal).collect()
    }
}

/// Bootstrap simulator resampling historical daily returns.
///
/// On simulated day `t` (1-based) a return is drawn uniformly, with
/// replacement, from the returns realized `t ..= t + lookback_days` trading
/// days before the start date. The pool therefore slides back through history
/// as the simulation moves forward, so every day draws from a full window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapSimulator {
    horizon_days: u32,
    lookback_days: u32,
    path_count: usize,
}

impl BootstrapSimulator {
    pub fn new(horizon_days: u32, lookback_days: u32) -> Self {
        Self {
            horizon_days,
            lookback_days,
            path_count: 100,
        }
    }

    pub fn from_term(term: &TermConfig, path_count: usize) -> Self {
        Self::new(term.horizon_days, term.lookback_days).paths(path_count)
    }

    pub fn paths(mut self, path_count: usize) -> Self {
        self.path_count = path_count;
        self
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    pub fn path_count(&self) -> usize {
        self.path_count
    }

    /// Defined returns needed strictly before the start date.
    pub fn required_history(&self) -> usize {
        (self.horizon_days + self.lookback_days) as usize
    }

    /// Row of `start_date` if the deepest lookback window fits in `series`.
    pub fn check_history(&self, series: &PriceSeries, start_date: NaiveDate) -> Result<usize> {
        let row = series.row(start_date)?;
        // row 0 has no return, so rows 1..row are usable
        let available = row.saturating_sub(1);
        let required = self.required_history();
        if available < required {
            return Err(VixError::InsufficientHistory {
                date: start_date,
                required,
                available,
            });
        }
        Ok(row)
    }

    pub fn simulate<R: Rng + ?Sized>(
        &self,
        series: &PriceSeries,
        start_date: NaiveDate,
        rng: &mut R,
    ) -> Result<PathEnsemble> {
        if self.horizon_days == 0 {
            return Err(VixError::InvalidInput("horizon_days must be >= 1".into()));
        }
        if self.path_count == 0 {
            return Err(VixError::InvalidInput("path_count must be >= 1".into()));
        }
        let row = self.check_history(series, start_date)?;

        let returns = series.returns();
        let spot = series.closes()[row];
        let horizon = self.horizon_days as usize;
        let lookback = self.lookback_days as usize;

        let mut paths = Vec::with_capacity(self.path_count);
        for _ in 0..self.path_count {
            let mut px = spot;
            let mut prices = Vec::with_capacity(horizon);
            for t in 1..=horizon {
                let newest = row - t;
                let pool = &returns[newest - lookback..=newest];
                px *= 1.0 + pool[rng.gen_range(0..pool.len())];
                if !(px.is_finite() && px > 0.0) {
                    return Err(VixError::InvalidInput(format!(
                        "simulated price left the positive range ({px}) on day {t} from {start_date}"
                    )));
                }
                prices.push(px);
            }
            paths.push(SimulatedPath { prices });
        }

        tracing::trace!(
            asset = series.name(),
            %start_date,
            horizon,
            lookback,
            paths = paths.len(),
            "path ensemble simulated"
        );

        Ok(PathEnsemble {
            start_date,
            spot,
            horizon_days: self.horizon_days,
            lookback_days: self.lookback_days,
            paths,
        })
    }
}

/// Simulate `path_count` bootstrap paths of `horizon_days` from `start_date`.
///
/// # Errors
///
/// * [`VixError::UnknownDate`] if `start_date` is not in the series.
/// * [`VixError::InsufficientHistory`] if the deepest lookback window reaches
///   past the oldest defined return. No partial ensemble is returned.
pub fn simulate_paths<R: Rng + ?Sized>(
    series: &PriceSeries,
    start_date: NaiveDate,
    horizon_days: u32,
    lookback_days: u32,
    path_count: usize,
    rng: &mut R,
) -> Result<PathEnsemble> {
    BootstrapSimulator::new(horizon_days, lookback_days)
        .paths(path_count)
        .simulate(series, start_date, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 6, 1).unwrap()
    }

    #[test]
    fn paths_have_horizon_length_and_dates() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i % 7) as f64).collect();
        let series = PriceSeries::from_daily_closes("x", start(), &closes).unwrap();
        let eval = series.last_date();
        let mut rng = StdRng::seed_from_u64(1);

        let ens = simulate_paths(&series, eval, 5, 10, 25, &mut rng).unwrap();
        assert_eq!(ens.len(), 25);
        assert!(ens.paths().iter().all(|p| p.len() == 5));
        assert_eq!(ens.dates().first(), Some(&(eval + Duration::days(1))));
        assert_eq!(ens.dates().last(), Some(&(eval + Duration::days(5))));
        assert_eq!(ens.spot(), *closes.last().unwrap());
        assert!(ens.path(0).is_none());
        assert!(ens.path(25).is_some());
        assert!(ens.path(26).is_none());
    }

    #[test]
    fn draws_come_from_sliding_window() {
        // Distinct return per day, so every draw identifies its source row.
        let mut closes = vec![100.0];
        for i in 1..30 {
            let prev = closes[i - 1];
            closes.push(prev * (1.0 + i as f64 / 1000.0));
        }
        let series = PriceSeries::from_daily_closes("x", start(), &closes).unwrap();
        let row = closes.len() - 1;
        let mut rng = StdRng::seed_from_u64(3);
        let (horizon, lookback) = (4usize, 2usize);

        let ens = simulate_paths(&series, series.last_date(), 4, 2, 50, &mut rng).unwrap();
        for path in ens.paths() {
            let mut prev = ens.spot();
            for (t, &px) in (1..=horizon).zip(path.prices()) {
                let r = px / prev - 1.0;
                let newest = row - t;
                let hit = (newest - lookback..=newest).any(|k| (series.returns()[k] - r).abs() < 1e-9);
                assert!(hit, "day {t} drew {r} outside its window");
                prev = px;
            }
        }
    }

    #[test]
    fn missing_history_is_fatal() {
        let series =
            PriceSeries::from_daily_closes("x", start(), &[1.0, 1.1, 1.2, 1.3, 1.4]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let err = simulate_paths(&series, series.last_date(), 3, 2, 10, &mut rng).unwrap_err();
        match err {
            VixError::InsufficientHistory {
                required,
                available,
                ..
            } => {
                assert_eq!(required, 5);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn zero_horizon_rejected() {
        let series = PriceSeries::from_daily_closes("x", start(), &[1.0; 10]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(simulate_paths(&series, series.last_date(), 0, 2, 10, &mut rng).is_err());
        assert!(simulate_paths(&series, series.last_date(), 2, 2, 0, &mut rng).is_err());
    }
}
