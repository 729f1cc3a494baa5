// demos/vix_series_demo.rs

//! Compute the volatility index series for one asset and write it as CSV.
//!
//! Usage:
//!     cargo run --release --example vix_series_demo -- <price_csv> [config.toml] [out.csv]

use anyhow::{bail, Context, Result};
use cryptovix::{default_configs, load, VixConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        bail!("usage: {} <price_csv> [config.toml] [out.csv]", args[0]);
    }
    let path = &args[1];
    let config = match args.get(2) {
        Some(cfg) => VixConfig::from_toml_file(cfg)?,
        None => default_configs::fast(),
    };
    let out = args.get(3).cloned().unwrap_or_else(|| "vix.csv".to_string());

    let asset = std::path::Path::new(path)
        .file_name()
        .and_then(|f| f.to_str())
        .and_then(|f| f.split('_').next())
        .unwrap_or("ASSET")
        .to_string();
    let series = load(&asset, path).with_context(|| format!("loading {path}"))?;

    #[cfg(feature = "parallel")]
    let vix = cryptovix::compute_index_series_parallel(&series, &config)?;
    #[cfg(not(feature = "parallel"))]
    let vix = cryptovix::compute_index_series(&series, &config)?;

    let values: Vec<f64> = vix.values().into_iter().filter(|v| v.is_finite()).collect();
    let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
    println!("{asset}: {} index values, mean {mean:.2}", vix.len());
    for sample in vix.samples().iter().rev().take(10) {
        println!(
            "  {} {:>8.3}  ({}/{} repeats)",
            sample.date, sample.value, sample.finite_repeats, sample.total_repeats
        );
    }

    vix.write_csv(&out)?;
    println!("Series written to {out}");

    Ok(())
}
