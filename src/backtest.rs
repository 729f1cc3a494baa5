//! Daily-rebalanced multi-asset portfolio walker.
//!
//! Each [`Portfolio::update`] advances one calendar day, rebalances the total
//! value to the supplied weights and applies every held asset's realized
//! return for the new day.

use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::data::PriceSeries;
use crate::error::{Result, VixError};

#[derive(Debug, Clone)]
pub struct Portfolio<'a> {
    name: String,
    date: NaiveDate,
    assets: &'a BTreeMap<String, PriceSeries>,
    weights: BTreeMap<String, f64>,
    total_value: f64,
    asset_values: BTreeMap<String, f64>,
    history: Vec<(NaiveDate, f64)>,
}

impl<'a> Portfolio<'a> {
    /// Allocate `starting_value` across `assets` by `weights`.
    ///
    /// Weights are normalized to sum to one; non-finite weights count as zero
    /// and assets missing from `weights` get nothing.
    pub fn new(
        name: impl Into<String>,
        date: NaiveDate,
        assets: &'a BTreeMap<String, PriceSeries>,
        weights: &BTreeMap<String, f64>,
        starting_value: f64,
    ) -> Result<Self> {
        if !starting_value.is_finite() {
            return Err(VixError::InvalidInput(format!(
                "starting value must be finite, got {starting_value}"
            )));
        }
        let weights = normalize_weights(assets, weights)?;
        let asset_values = allocate(starting_value, &weights);
        Ok(Self {
            name: name.into(),
            date,
            assets,
            weights,
            total_value: starting_value,
            asset_values,
            history: vec![(date, starting_value)],
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    /// Normalized weights in effect since the last update.
    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    pub fn asset_values(&self) -> &BTreeMap<String, f64> {
        &self.asset_values
    }

    /// `(date, total value)` after construction and after every update.
    pub fn history(&self) -> &[(NaiveDate, f64)] {
        &self.history
    }

    /// Advance one day, rebalance to `weights` and apply realized returns.
    ///
    /// Assets whose history starts after the new date are zeroed without
    /// renormalizing the rest, so part of the value sits out that day. An
    /// undefined return (the asset's first row) counts as flat.
    ///
    /// # Errors
    ///
    /// [`VixError::UnknownDate`] if a held asset has no row for the new date.
    pub fn update(&mut self, weights: &BTreeMap<String, f64>) -> Result<()> {
        let date = self.date + Duration::days(1);
        let mut weights = normalize_weights(self.assets, weights)?;

        for (asset, weight) in weights.iter_mut() {
            let series = &self.assets[asset];
            if *weight != 0.0 && series.first_date() > date {
                tracing::warn!(
                    portfolio = %self.name,
                    asset = %asset,
                    %date,
                    starts = %series.first_date(),
                    "weight on asset before its first close, zeroed"
                );
                *weight = 0.0;
            }
        }

        let mut values = allocate(self.total_value, &weights);
        for (asset, value) in values.iter_mut() {
            if *value == 0.0 {
                continue;
            }
            let series = &self.assets[asset];
            if !series.contains(date) {
                return Err(VixError::UnknownDate {
                    asset: asset.clone(),
                    date,
                });
            }
            let ret = series.pct_return(date).unwrap_or(0.0);
            *value *= 1.0 + ret;
        }

        self.total_value = values.values().filter(|v| v.is_finite()).sum();
        self.date = date;
        self.weights = weights;
        self.asset_values = values;
        self.history.push((date, self.total_value));

        tracing::debug!(
            portfolio = %self.name,
            %date,
            total = self.total_value,
            "portfolio updated"
        );
        Ok(())
    }

    /// Hold the same weights for `days` consecutive updates.
    pub fn hold(&mut self, weights: &BTreeMap<String, f64>, days: usize) -> Result<()> {
        for _ in 0..days {
            self.update(weights)?;
        }
        Ok(())
    }
}

fn normalize_weights(
    assets: &BTreeMap<String, PriceSeries>,
    weights: &BTreeMap<String, f64>,
) -> Result<BTreeMap<String, f64>> {
    if let Some(unknown) = weights.keys().find(|k| !assets.contains_key(*k)) {
        return Err(VixError::InvalidInput(format!(
            "weight given for unknown asset '{unknown}'"
        )));
    }
    let total: f64 = weights.values().filter(|w| w.is_finite()).sum();
    if total == 0.0 || !total.is_finite() {
        return Err(VixError::InvalidInput(format!(
            "weights must have a finite non-zero sum, got {total}"
        )));
    }
    Ok(assets
        .keys()
        .map(|asset| {
            let w = weights.get(asset).copied().filter(|w| w.is_finite());
            (asset.clone(), w.map_or(0.0, |w| w / total))
        })
        .collect())
}

fn allocate(total: f64, weights: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    weights
        .iter()
        .map(|(asset, w)| (asset.clone(), total * w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 2, day).unwrap()
    }

    fn assets() -> BTreeMap<String, PriceSeries> {
        let mut map = BTreeMap::new();
        map.insert(
            "btc".to_string(),
            PriceSeries::from_daily_closes("btc", d(1), &[100.0, 110.0, 99.0, 99.0]).unwrap(),
        );
        map.insert(
            "eth".to_string(),
            PriceSeries::from_daily_closes("eth", d(3), &[10.0, 12.0]).unwrap(),
        );
        map
    }

    fn w(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn weights_normalized_on_construction() {
        let assets = assets();
        let p = Portfolio::new("p", d(1), &assets, &w(&[("btc", 3.0), ("eth", 1.0)]), 1000.0)
            .unwrap();
        assert_eq!(p.weights()["btc"], 0.75);
        assert_eq!(p.asset_values()["eth"], 250.0);
        assert_eq!(p.total_value(), 1000.0);
    }

    #[test]
    fn premature_asset_zeroed_without_renormalizing() {
        let assets = assets();
        let weights = w(&[("btc", 1.0), ("eth", 1.0)]);
        let mut p = Portfolio::new("p", d(1), &assets, &weights, 1000.0).unwrap();

        // eth starts on the 3rd: half the value sits out on the 2nd
        p.update(&weights).unwrap();
        assert_eq!(p.date(), d(2));
        assert_eq!(p.weights()["eth"], 0.0);
        assert!((p.total_value() - 550.0).abs() < 1e-9);

        // both held on the 3rd: btc -10%, eth first row counts as flat
        p.update(&weights).unwrap();
        assert!((p.total_value() - (275.0 * 0.9 + 275.0)).abs() < 1e-9);
        assert_eq!(p.history().len(), 3);
    }

    #[test]
    fn missing_row_for_held_asset_is_error() {
        let assets = assets();
        let weights = w(&[("eth", 1.0)]);
        let mut p = Portfolio::new("p", d(3), &assets, &weights, 100.0).unwrap();
        p.update(&weights).unwrap();
        assert!((p.total_value() - 120.0).abs() < 1e-9);
        assert!(matches!(p.update(&weights), Err(VixError::UnknownDate { .. })));
    }

    #[test]
    fn bad_weights_rejected() {
        let assets = assets();
        assert!(Portfolio::new("p", d(1), &assets, &w(&[("doge", 1.0)]), 1.0).is_err());
        assert!(Portfolio::new("p", d(1), &assets, &w(&[("btc", f64::NAN)]), 1.0).is_err());
        let p = Portfolio::new("p", d(1), &assets, &w(&[("btc", 1.0), ("eth", f64::NAN)]), 1.0)
            .unwrap();
        assert_eq!(p.weights()["eth"], 0.0);
    }
}
