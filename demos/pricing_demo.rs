// demos/pricing_demo.rs

//! Empirical option pricing on a single date.
//!
//! This example shows how to:
//! 1. Load a price series
//! 2. Simulate bootstrap paths from recent returns
//! 3. Price calls and puts off the simulated terminal prices
//! 4. Build the near- and next-term strips used by the index
//!
//! Usage:
//!     cargo run --example pricing_demo -- [price_csv]

use anyhow::{Context, Result};
use cryptovix::{
    build_strip, default_configs, discount_factor, load, price_option, simulate_paths,
    OptionType,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/data/wavy_price.csv".to_string());
    let series = load("DEMO", &path).with_context(|| format!("loading {path}"))?;
    let date = series.last_date();
    let spot = series.close(date).context("last date has no close")?;

    println!("Empirical Pricing Demo");
    println!("======================");
    println!("Series: {} rows, {} to {}", series.len(), series.first_date(), date);
    println!("Spot on {date}: {spot:.2}");

    // Step 1: one ensemble, 30 days ahead, drawing from a 30-day window
    let mut rng = StdRng::seed_from_u64(109);
    let ensemble = simulate_paths(&series, date, 30, 30, 1_000, &mut rng)?;
    let rate = 0.03;
    let df = discount_factor(30, rate);

    println!("\nStep 1: {} paths over 30 days (discount factor {df:.6})", ensemble.len());
    println!("{:>10} | {:>10} | {:>10} | {:>12}", "Strike", "Call", "Put", "Call - Put");
    for moneyness in [0.8, 0.9, 1.0, 1.1, 1.2] {
        let strike = spot * moneyness;
        let call = price_option(&ensemble, strike, OptionType::Call, rate);
        let put = price_option(&ensemble, strike, OptionType::Put, rate);
        println!("{strike:>10.2} | {call:>10.4} | {put:>10.4} | {:>12.4}", call - put);
    }

    // Step 2: the strips behind one index repeat
    let config = default_configs::reference();
    let (near, next) = build_strip(&series, date, &config, &mut rng)?;
    for (label, strip) in [("near", &near), ("next", &next)] {
        println!(
            "\nStep 2: {label} strip, {} days, {} strikes",
            strip.horizon_days,
            strip.len()
        );
        for row in strip.rows() {
            println!("{:>10.2} | {:>10.4} | {:>10.4}", row.strike, row.call, row.put);
        }
    }

    Ok(())
}
