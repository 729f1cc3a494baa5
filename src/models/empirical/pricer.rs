// Empirical option pricing: discounted mean payoff over simulated terminal prices.
// No distribution is fitted and put/call parity is not imposed. With finite
// ensembles priced independently, call - put only matches the discounted
// forward minus strike up to Monte Carlo noise.

use statrs::statistics::Statistics;

use crate::engine::types::{OptionQuote, OptionType};
use crate::models::bootstrap::PathEnsemble;

/// Day count used for simple-interest discounting.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Simple-interest discount factor `(1 + days/365 * rate)^-1`.
#[inline]
pub fn discount_factor(days_to_expiry: u32, rate: f64) -> f64 {
    1.0 / (1.0 + (days_to_expiry as f64 / DAYS_PER_YEAR) * rate)
}

/// Price from a set of terminal prices.
///
/// Paths with a non-finite terminal are left out of the mean. Returns NaN when
/// no path is usable.
pub fn price_from_terminals(
    terminals: &[f64],
    strike: f64,
    option_type: OptionType,
    rate: f64,
    days_to_expiry: u32,
) -> f64 {
    let payoffs: Vec<f64> = terminals
        .iter()
        .filter(|s| s.is_finite())
        .map(|&s| option_type.payoff(s, strike))
        .collect();

    let excluded = terminals.len() - payoffs.len();
    if excluded > 0 {
        tracing::debug!(
            excluded,
            total = terminals.len(),
            %option_type,
            strike,
            "non-finite terminal prices excluded from payoff mean"
        );
    }
    if payoffs.is_empty() {
        tracing::warn!(%option_type, strike, "no finite payoffs, price is NaN");
        return f64::NAN;
    }

    payoffs.iter().mean() * discount_factor(days_to_expiry, rate)
}

/// Price one option off an ensemble; expiry is the ensemble's horizon.
pub fn price_option(
    ensemble: &PathEnsemble,
    strike: f64,
    option_type: OptionType,
    rate: f64,
) -> f64 {
    price_from_terminals(
        &ensemble.terminals(),
        strike,
        option_type,
        rate,
        ensemble.horizon_days(),
    )
}

pub fn quote_option(
    ensemble: &PathEnsemble,
    strike: f64,
    option_type: OptionType,
    rate: f64,
) -> OptionQuote {
    OptionQuote {
        strike,
        option_type,
        price: price_option(ensemble, strike, option_type, rate),
    }
}

/// Call and put at one strike from the same terminal prices.
pub fn price_call_put(terminals: &[f64], strike: f64, rate: f64, days_to_expiry: u32) -> (f64, f64) {
    (
        price_from_terminals(terminals, strike, OptionType::Call, rate, days_to_expiry),
        price_from_terminals(terminals, strike, OptionType::Put, rate, days_to_expiry),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_is_simple_interest() {
        assert_eq!(discount_factor(30, 0.0), 1.0);
        let df = discount_factor(365, 0.05);
        assert!((df - 1.0 / 1.05).abs() < 1e-15);
    }

    #[test]
    fn mean_payoff_discounted() {
        let terminals = [90.0, 100.0, 110.0, 120.0];
        let call = price_from_terminals(&terminals, 100.0, OptionType::Call, 0.0, 5);
        let put = price_from_terminals(&terminals, 100.0, OptionType::Put, 0.0, 5);
        assert!((call - 7.5).abs() < 1e-12);
        assert!((put - 2.5).abs() < 1e-12);

        let df = discount_factor(73, 0.1);
        let call_r = price_from_terminals(&terminals, 100.0, OptionType::Call, 0.1, 73);
        assert!((call_r - 7.5 * df).abs() < 1e-12);
    }

    #[test]
    fn non_finite_terminals_excluded() {
        let terminals = [f64::NAN, 110.0, f64::INFINITY, 90.0];
        let call = price_from_terminals(&terminals, 100.0, OptionType::Call, 0.0, 1);
        assert!((call - 5.0).abs() < 1e-12);
        assert!(price_from_terminals(&[f64::NAN], 1.0, OptionType::Put, 0.0, 1).is_nan());
    }
}
