use chrono::NaiveDate;
use rand::Rng;
use statrs::statistics::Statistics;

use crate::data::PriceSeries;
use crate::engine::config::VixConfig;
use crate::engine::types::{
    AtmStrike, IndexComponents, IndexEstimate, OptionStrip, OptionType, StripRow, TermEstimate,
};
use crate::error::{Result, VixError};
use crate::models::empirical::DAYS_PER_YEAR;

use super::strip::build_strip;

/// Row whose call and put prices are closest, `min |call - put|`.
///
/// Ties go to the lowest strike. Rows with a non-finite gap are skipped;
/// `None` when no row qualifies.
pub fn closest_strike(strip: &OptionStrip) -> Option<&StripRow> {
    let mut best: Option<(&StripRow, f64)> = None;
    for row in strip.rows() {
        let gap = (row.call - row.put).abs();
        if !gap.is_finite() {
            continue;
        }
        match best {
            Some((_, best_gap)) if best_gap <= gap => {}
            _ => best = Some((row, gap)),
        }
    }
    best.map(|(row, _)| row)
}

/// Synthetic forward `K + e^(rT) (call - put)` at one strike.
#[inline]
pub fn forward_price(row: &StripRow, rate: f64, year_fraction: f64) -> f64 {
    row.strike + (rate * year_fraction).exp() * (row.call - row.put)
}

/// Grid strike adjacent to `anchor` on one side.
///
/// For calls the smallest strike strictly above `anchor`, for puts the largest
/// strictly below. The index anchors on the closest strike `K*`. Falls back to
/// the anchor itself when that side of the grid is empty.
pub fn atm_strike(strikes: &[f64], anchor: f64, option_type: OptionType) -> AtmStrike {
    let found = match option_type {
        OptionType::Call => strikes
            .iter()
            .copied()
            .filter(|&k| k > anchor)
            .min_by(f64::total_cmp),
        OptionType::Put => strikes
            .iter()
            .copied()
            .filter(|&k| k < anchor)
            .max_by(f64::total_cmp),
    };
    match found {
        Some(k) => AtmStrike::Adjacent(k),
        None => {
            tracing::debug!(anchor, %option_type, "no grid strike beyond anchor, using anchor");
            AtmStrike::Fallback(anchor)
        }
    }
}

/// Out-of-the-money contribution: puts strictly below `k0_put` plus calls
/// strictly above `k0_call`, each weighted by `1/K^2`.
pub fn strike_sum(strip: &OptionStrip, k0_put: f64, k0_call: f64) -> f64 {
    strip
        .rows()
        .iter()
        .map(|row| {
            if row.strike < k0_put {
                row.put / (row.strike * row.strike)
            } else if row.strike > k0_call {
                row.call / (row.strike * row.strike)
            } else {
                0.0
            }
        })
        .sum()
}

/// Variance estimate for one maturity.
///
/// `reference_strike` normalizes the forward-adjustment term
/// `(F / K_ref - 1)^2 / T`. `None` uses the strip's own closest strike; the
/// next-term estimate passes the near-term closest strike.
///
/// A strip without any finite `call - put` gap yields NaN quantities rather
/// than an error, so the repeat drops out of the average downstream.
pub fn estimate_term(
    strip: &OptionStrip,
    rate: f64,
    reference_strike: Option<f64>,
) -> Result<TermEstimate> {
    if strip.horizon_days == 0 {
        return Err(VixError::InvalidInput("strip horizon must be >= 1 day".into()));
    }
    let spacing = strip
        .spacing()
        .ok_or_else(|| VixError::InvalidInput("strip needs at least two strikes".into()))?;

    let year_fraction = strip.horizon_days as f64 / DAYS_PER_YEAR;
    let (closest, forward) = match closest_strike(strip) {
        Some(row) => (row.strike, forward_price(row, rate, year_fraction)),
        None => {
            tracing::warn!(horizon = strip.horizon_days, "no finite call/put gap in strip");
            (f64::NAN, f64::NAN)
        }
    };

    let strikes = strip.strikes();
    let k0_call = atm_strike(&strikes, closest, OptionType::Call);
    let k0_put = atm_strike(&strikes, closest, OptionType::Put);
    let delta = spacing / 2.0;
    let sum = strike_sum(strip, k0_put.strike(), k0_call.strike());

    let norm = reference_strike.unwrap_or(closest);
    let carry = (rate * year_fraction).exp();
    let variance = carry * delta * (2.0 / year_fraction) * sum
        - (forward / norm - 1.0).powi(2) / year_fraction;

    Ok(TermEstimate {
        horizon_days: strip.horizon_days,
        year_fraction,
        closest_strike: closest,
        forward,
        k0_call,
        k0_put,
        delta,
        strike_sum: sum,
        variance,
    })
}

/// Combine both maturities into `100 * sqrt(T1 var1 + T2 var2)`.
///
/// The total is not interpolated to a constant maturity. A negative total is
/// NaN, except that with `floor_negative` set a strip pair carrying no
/// out-of-the-money value at all (both strike sums zero, as on a flat
/// history) reports 0.
pub fn combine(near: TermEstimate, next: TermEstimate, floor_negative: bool) -> IndexComponents {
    let total_variance = near.year_fraction * near.variance + next.year_fraction * next.variance;
    let no_wings = near.strike_sum == 0.0 && next.strike_sum == 0.0;
    let floored = floor_negative && no_wings && total_variance < 0.0;
    let value = if floored {
        0.0
    } else {
        100.0 * total_variance.sqrt()
    };
    IndexComponents {
        near,
        next,
        total_variance,
        floored,
        value,
    }
}

/// One index repeat from already-built strips.
pub fn index_from_strips(
    near: &OptionStrip,
    next: &OptionStrip,
    config: &VixConfig,
) -> Result<IndexComponents> {
    let near_term = estimate_term(near, config.discount_rate, None)?;
    let next_term = estimate_term(next, config.discount_rate, Some(near_term.closest_strike))?;
    Ok(combine(near_term, next_term, config.floor_negative_variance))
}

/// Index value for one evaluation date.
///
/// Builds fresh strips `config.repeats` times and averages the finite repeat
/// values. The result is NaN when no repeat is finite.
///
/// # Errors
///
/// Missing dates and short history are fatal for the date and propagate
/// unchanged; see [`crate::models::bootstrap::BootstrapSimulator::check_history`].
pub fn compute_index<R: Rng + ?Sized>(
    series: &PriceSeries,
    date: NaiveDate,
    config: &VixConfig,
    rng: &mut R,
) -> Result<IndexEstimate> {
    config.validate()?;

    let mut repeats = Vec::with_capacity(config.repeats);
    for _ in 0..config.repeats {
        let (near, next) = build_strip(series, date, config, rng)?;
        repeats.push(index_from_strips(&near, &next, config)?);
    }

    let finite: Vec<f64> = repeats
        .iter()
        .map(|c| c.value)
        .filter(|v| v.is_finite())
        .collect();
    let value = if finite.is_empty() {
        f64::NAN
    } else {
        finite.iter().mean()
    };

    if finite.len() < repeats.len() {
        tracing::warn!(
            asset = series.name(),
            %date,
            excluded = repeats.len() - finite.len(),
            total = repeats.len(),
            "non-finite index repeats excluded from mean"
        );
    }
    tracing::debug!(asset = series.name(), %date, value, "index computed");

    Ok(IndexEstimate {
        date,
        value,
        finite_repeats: finite.len(),
        repeats,
    })
}
