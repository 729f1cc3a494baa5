use chrono::NaiveDate;
use rand::Rng;

use crate::data::PriceSeries;
use crate::engine::config::{SamplingMode, TermConfig, VixConfig};
use crate::engine::types::{OptionStrip, OptionType, StripRow};
use crate::error::Result;
use crate::models::bootstrap::BootstrapSimulator;
use crate::models::empirical::{price_call_put, price_option};

/// Price calls and puts across one maturity's strike grid.
///
/// The grid is `term.grid_points` strikes spread evenly over
/// `spot * (1 ± term.band)`. With [`SamplingMode::PerQuote`] every strike and
/// option type gets its own ensemble (call first, then put, strike-ascending);
/// with [`SamplingMode::Shared`] one ensemble prices the whole grid.
///
/// This is the expensive step: `grid_points * 2 * path_count * horizon_days`
/// draws per strip in per-quote mode.
pub fn build_term_strip<R: Rng + ?Sized>(
    series: &PriceSeries,
    evaluation_date: NaiveDate,
    term: &TermConfig,
    config: &VixConfig,
    rng: &mut R,
) -> Result<OptionStrip> {
    let simulator = BootstrapSimulator::from_term(term, config.path_count);
    let row = simulator.check_history(series, evaluation_date)?;
    let spot = series.closes()[row];
    let rate = config.discount_rate;
    let strikes = term.strike_grid(spot);

    let mut rows = Vec::with_capacity(strikes.len());
    match config.sampling {
        SamplingMode::PerQuote => {
            for strike in strikes {
                let call_paths = simulator.simulate(series, evaluation_date, rng)?;
                let call = price_option(&call_paths, strike, OptionType::Call, rate);
                let put_paths = simulator.simulate(series, evaluation_date, rng)?;
                let put = price_option(&put_paths, strike, OptionType::Put, rate);
                rows.push(StripRow { strike, call, put });
            }
        }
        SamplingMode::Shared => {
            let ensemble = simulator.simulate(series, evaluation_date, rng)?;
            let terminals = ensemble.terminals();
            for strike in strikes {
                let (call, put) = price_call_put(&terminals, strike, rate, term.horizon_days);
                rows.push(StripRow { strike, call, put });
            }
        }
    }

    tracing::debug!(
        asset = series.name(),
        %evaluation_date,
        horizon = term.horizon_days,
        strikes = rows.len(),
        spot,
        "option strip built"
    );

    Ok(OptionStrip::new(term.horizon_days, spot, rows))
}

/// Near- and next-term strips for one evaluation date.
pub fn build_strip<R: Rng + ?Sized>(
    series: &PriceSeries,
    evaluation_date: NaiveDate,
    config: &VixConfig,
    rng: &mut R,
) -> Result<(OptionStrip, OptionStrip)> {
    let near = build_term_strip(series, evaluation_date, &config.near, config, rng)?;
    let next = build_term_strip(series, evaluation_date, &config.next, config, rng)?;
    Ok((near, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn wavy_series(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 * (1.0 + 0.03 * ((i as f64) * 0.7).sin()))
            .collect();
        let first = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        PriceSeries::from_daily_closes("wavy", first, &closes).unwrap()
    }

    #[test]
    fn grids_follow_term_config() {
        let series = wavy_series(80);
        let date = series.last_date();
        let config = VixConfig::minimal();
        let mut rng = StdRng::seed_from_u64(11);

        let (near, next) = build_strip(&series, date, &config, &mut rng).unwrap();
        let spot = series.close(date).unwrap();

        assert_eq!(near.len(), 10);
        assert_eq!(next.len(), 20);
        assert_eq!(near.horizon_days, 5);
        assert_eq!(next.horizon_days, 30);
        assert!((near.strikes()[0] - spot * 0.9).abs() < 1e-9);
        assert!((next.strikes()[19] - spot * 1.2).abs() < 1e-9);
        for row in near.rows().iter().chain(next.rows()) {
            assert!(row.call >= 0.0 && row.call.is_finite());
            assert!(row.put >= 0.0 && row.put.is_finite());
        }
    }

    #[test]
    fn shared_sampling_keeps_calls_monotone() {
        let series = wavy_series(80);
        let mut config = VixConfig::minimal();
        config.path_count = 200;
        let mut rng = StdRng::seed_from_u64(5);

        let term = config.next.clone();
        let strip = build_term_strip(&series, series.last_date(), &term, &config, &mut rng).unwrap();
        for w in strip.rows().windows(2) {
            assert!(w[1].call <= w[0].call + 1e-12);
            assert!(w[1].put + 1e-12 >= w[0].put);
        }
    }

    #[test]
    fn short_history_fails_before_pricing() {
        let series = wavy_series(20);
        let config = VixConfig::minimal();
        let mut rng = StdRng::seed_from_u64(5);
        assert!(build_strip(&series, series.last_date(), &config, &mut rng).is_err());
    }
}
