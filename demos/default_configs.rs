use cryptovix::{default_configs, VixConfig};

fn describe(label: &str, config: &VixConfig, use_case: &str) {
    let per_date = config.repeats
        * config.path_count
        * [&config.near, &config.next]
            .iter()
            .map(|t| t.horizon_days as usize * t.grid_points * 2)
            .sum::<usize>();
    println!("{label}:");
    println!("   Repeats: {}", config.repeats);
    println!("   Paths per ensemble: {}", config.path_count);
    println!("   Sampling: {:?}", config.sampling);
    println!("   Seed: {}", config.seed);
    println!("   Return draws per date (per-quote upper bound): {per_date}");
    println!("   Use case: {use_case}\n");
}

fn main() {
    println!("cryptovix Default Configuration Examples\n");

    describe(
        "1. Reference Configuration",
        &default_configs::reference(),
        "Reproducing the reference index",
    );
    describe(
        "2. Fast Configuration",
        &default_configs::fast(),
        "Development, quick looks at new data",
    );
    describe(
        "3. Research Configuration",
        &default_configs::research(),
        "Low-noise studies, overnight runs",
    );
    describe(
        "4. Minimal Configuration",
        &default_configs::minimal(),
        "Smoke tests",
    );

    // 5. Overriding from TOML; missing keys keep their defaults
    let custom = VixConfig::from_toml_str(
        r#"
        discount_rate = 0.02
        sampling = "shared"

        [next]
        horizon_days = 30
        lookback_days = 90
        band = 0.25
        grid_points = 25
        "#,
    );
    match custom {
        Ok(config) => {
            println!("5. Custom TOML Configuration:");
            println!("   Discount rate: {}", config.discount_rate);
            println!("   Next-term lookback: {} days", config.next.lookback_days);
            println!(
                "   First evaluable row: {}",
                config.first_evaluable_row()
            );
        }
        Err(e) => eprintln!("Invalid configuration: {e}"),
    }
}
