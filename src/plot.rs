//! SVG rendering of simulated paths.

use anyhow::{anyhow, ensure, Result};
use plotters::prelude::*;
use std::path::Path;

use crate::models::bootstrap::PathEnsemble;

/// Draw every path of `ensemble` in translucent blue against day offset, with
/// an optional realized path in red on top.
///
/// Day 0 is the start date at spot; `realized`, when given, holds the actual
/// closes for days `1..=horizon` and must not be longer than the horizon.
pub fn plot_paths(
    ensemble: &PathEnsemble,
    realized: Option<&[f64]>,
    asset: &str,
    out_path: impl AsRef<Path>,
) -> Result<()> {
    ensure!(!ensemble.is_empty(), "no paths to plot");
    let horizon = ensemble.horizon_days() as usize;
    if let Some(real) = realized {
        ensure!(
            real.len() <= horizon,
            "realized path has {} points, horizon is {horizon}",
            real.len()
        );
    }

    let spot = ensemble.spot();
    let (mut lo, mut hi) = (spot, spot);
    let all_prices = ensemble
        .paths()
        .iter()
        .flat_map(|p| p.prices().iter())
        .chain(realized.into_iter().flatten());
    for &px in all_prices.filter(|px| px.is_finite()) {
        lo = lo.min(px);
        hi = hi.max(px);
    }
    let pad = ((hi - lo) * 0.05).max(spot * 0.01);

    let out_path = out_path.as_ref();
    let root = SVGBackend::new(out_path, (1280, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(
            format!(
                "{asset} | {} paths from {} ({}d horizon, {}d lookback)",
                ensemble.len(),
                ensemble.start_date(),
                horizon,
                ensemble.lookback_days()
            ),
            ("sans-serif", 28),
        )
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0usize..horizon, (lo - pad)..(hi + pad))?;

    chart
        .configure_mesh()
        .x_desc(format!("Days after {}", ensemble.start_date()))
        .y_desc(format!("{asset} price"))
        .draw()?;

    let path_style = BLUE.mix(0.2);
    chart.draw_series(
        ensemble
            .paths()
            .iter()
            .map(|path| PathElement::new(from_spot(spot, path.prices()), path_style)),
    )?;

    if let Some(real) = realized {
        chart
            .draw_series(std::iter::once(PathElement::new(
                from_spot(spot, real),
                RED.stroke_width(2),
            )))?
            .label("realized")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()
        .map_err(|e| anyhow!("failed to write {}: {e}", out_path.display()))?;
    tracing::debug!(path = %out_path.display(), paths = ensemble.len(), "path plot written");
    Ok(())
}

/// `(day, price)` points starting from spot at day 0.
fn from_spot(spot: f64, prices: &[f64]) -> Vec<(usize, f64)> {
    std::iter::once((0, spot))
        .chain(prices.iter().copied().enumerate().map(|(i, px)| (i + 1, px)))
        .collect()
}
