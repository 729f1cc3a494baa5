// demos/plot_paths.rs
// Simulates bootstrap paths from a historical date and plots them against the
// price path that actually followed.
//
// Usage:
//     cargo run --example plot_paths -- <price_csv> <YYYY-MM-DD> [horizon] [lookback]
//
// The output image is written to paths.svg in the working directory.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use cryptovix::{load, plot::plot_paths, simulate_paths};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        bail!(
            "usage: {} <price_csv> <YYYY-MM-DD> [horizon] [lookback]",
            args[0]
        );
    }
    let series = load("ASSET", &args[1]).with_context(|| format!("loading {}", args[1]))?;
    let start = NaiveDate::parse_from_str(&args[2], "%Y-%m-%d")?;
    let horizon: u32 = args.get(3).map(|s| s.parse()).transpose()?.unwrap_or(30);
    let lookback: u32 = args.get(4).map(|s| s.parse()).transpose()?.unwrap_or(30);

    let mut rng = StdRng::seed_from_u64(109);
    let ensemble = simulate_paths(&series, start, horizon, lookback, 100, &mut rng)?;

    // realized closes after the start date, if the file covers them
    let row = series.position(start).context("start date not in series")?;
    let realized: Vec<f64> = series
        .closes()
        .iter()
        .skip(row + 1)
        .take(horizon as usize)
        .copied()
        .collect();

    plot_paths(
        &ensemble,
        (!realized.is_empty()).then_some(realized.as_slice()),
        series.name(),
        "paths.svg",
    )?;
    println!("Chart saved to paths.svg");
    Ok(())
}
