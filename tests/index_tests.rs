
use cryptovix::models::vix::{estimate_term, index_from_strips};
use cryptovix::{
    build_strip, compute_index, compute_index_series, evaluation_dates, AtmStrike, OptionStrip,
    SeriesRun, StripRow, VixError, VixSeries,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use test_utils::{create_per_quote_config, create_test_config, flat_series, wavy_series};

/// Bitwise comparison so undefined (NaN) samples compare equal to themselves.
fn same_values(a: &VixSeries, b: &VixSeries) -> bool {
    a.dates() == b.dates()
        && a.values().iter().zip(b.values()).all(|(x, y)| x.to_bits() == y.to_bits())
}

/// Zero returns give a strip with no out-of-the-money value, leaving only the
/// negative forward-adjustment term. The total is floored to 0.
#[test]
fn test_flat_history_index_is_zero() {
    let series = flat_series(70, 250.0);
    let config = create_per_quote_config();
    let mut rng = StdRng::seed_from_u64(109);

    let estimate = compute_index(&series, series.last_date(), &config, &mut rng).unwrap();
    assert_eq!(estimate.value, 0.0);
    assert_eq!(estimate.finite_repeats, config.repeats);
    for repeat in &estimate.repeats {
        assert!(repeat.floored);
        assert_eq!(repeat.near.strike_sum, 0.0);
        assert!(repeat.total_variance < 0.0);
    }
}

#[test]
fn test_flat_history_without_floor_is_undefined() {
    let series = flat_series(70, 250.0);
    let mut config = create_test_config();
    config.floor_negative_variance = false;
    let mut rng = StdRng::seed_from_u64(109);

    let estimate = compute_index(&series, series.last_date(), &config, &mut rng).unwrap();
    assert!(estimate.value.is_nan());
    assert_eq!(estimate.finite_repeats, 0);
    assert_eq!(estimate.sample().total_repeats, config.repeats);
}

/// The adjacent-strike search starts from the closest strike, not the
/// forward. With the forward past the top of the grid the call side still
/// finds a strike above K*.
#[test]
fn test_adjacent_strikes_follow_closest_strike() {
    let strip = OptionStrip::new(
        5,
        100.0,
        vec![
            StripRow { strike: 90.0, call: 35.0, put: 0.0 },
            StripRow { strike: 100.0, call: 25.0, put: 0.0 },
            StripRow { strike: 110.0, call: 26.0, put: 0.0 },
        ],
    );
    let estimate = estimate_term(&strip, 0.0, None).unwrap();
    assert_eq!(estimate.closest_strike, 100.0);
    assert_eq!(estimate.forward, 125.0);
    assert_eq!(estimate.k0_call, AtmStrike::Adjacent(110.0));
    assert_eq!(estimate.k0_put, AtmStrike::Adjacent(90.0));
    assert_eq!(estimate.strike_sum, 0.0);
}

#[test]
fn test_closest_at_top_of_grid_uses_fallback() {
    let strip = OptionStrip::new(
        30,
        100.0,
        vec![
            StripRow { strike: 90.0, call: 12.0, put: 1.0 },
            StripRow { strike: 100.0, call: 6.0, put: 2.0 },
            StripRow { strike: 110.0, call: 3.0, put: 3.5 },
        ],
    );
    let estimate = estimate_term(&strip, 0.0, None).unwrap();
    assert_eq!(estimate.closest_strike, 110.0);
    assert_eq!(estimate.k0_call, AtmStrike::Fallback(110.0));
    assert_eq!(estimate.k0_put, AtmStrike::Adjacent(100.0));
    // only the 90 put lies below K0_put
    assert!((estimate.strike_sum - 1.0 / 8100.0).abs() < 1e-15);
    assert!(estimate.variance.is_finite());
}

#[test]
fn test_next_term_normalized_by_near_closest_strike() {
    let series = wavy_series(90);
    let config = create_test_config();
    let mut rng = StdRng::seed_from_u64(17);
    let (near, next) = build_strip(&series, series.last_date(), &config, &mut rng).unwrap();

    let combined = index_from_strips(&near, &next, &config).unwrap();
    let near_closest = combined.near.closest_strike;
    let expected = estimate_term(&next, config.discount_rate, Some(near_closest)).unwrap();
    assert_eq!(combined.next.variance, expected.variance);
    println!(
        "near K* {:.2}, next K* {:.2}, index {:.3}",
        near_closest, combined.next.closest_strike, combined.value
    );
}

#[test]
fn test_series_covers_evaluable_dates() {
    let series = wavy_series(70);
    let config = create_test_config();

    let vix = compute_index_series(&series, &config).unwrap();
    assert_eq!(vix.len(), 9);
    assert_eq!(vix.dates(), series.dates()[61..].to_vec());
    assert_eq!(vix.dates(), evaluation_dates(&series, &config));
    for sample in vix.samples() {
        assert!(sample.value.is_nan() || sample.value >= 0.0, "{sample:?}");
    }
    assert!(vix.values().iter().any(|v| v.is_finite()));

    let again = compute_index_series(&series, &config).unwrap();
    assert!(same_values(&vix, &again));
}

#[test]
fn test_series_too_short_is_empty() {
    let series = wavy_series(61);
    let vix = compute_index_series(&series, &create_test_config()).unwrap();
    assert!(vix.is_empty());
}

#[test]
fn test_series_interrupted_keeps_completed_samples() {
    let series = wavy_series(70);
    let config = create_test_config();
    let d = series.dates();
    let missing = series.last_date() + chrono::Duration::days(10);

    let err = SeriesRun::new(&series, &config)
        .with_dates(vec![d[62], missing, d[64]])
        .run()
        .unwrap_err();
    match err {
        VixError::SeriesInterrupted {
            date,
            completed,
            source,
        } => {
            assert_eq!(date, missing);
            assert_eq!(completed.dates(), vec![d[62], d[64]]);
            assert!(matches!(*source, VixError::UnknownDate { .. }));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_series_is_reproducible() {
    use cryptovix::compute_index_series_parallel;

    let series = wavy_series(72);
    let config = create_test_config();

    let first = compute_index_series_parallel(&series, &config).unwrap();
    let second = compute_index_series_parallel(&series, &config).unwrap();
    assert!(same_values(&first, &second));
    assert_eq!(first.dates(), evaluation_dates(&series, &config));

    let run = SeriesRun::new(&series, &config);
    for sample in first.samples() {
        let direct = run.estimate_seeded(sample.date).unwrap();
        assert_eq!(direct.value.to_bits(), sample.value.to_bits());
    }
}

#[test]
fn test_write_csv_has_header_and_rows() {
    let series = wavy_series(64);
    let vix = compute_index_series(&series, &create_test_config()).unwrap();
    let path = std::env::temp_dir().join(format!("cryptovix_{}_vix.csv", std::process::id()));
    vix.write_csv(&path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers, vec!["date", "vix"]);
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), vix.len());
    assert_eq!(rows[0][0], vix.dates()[0].to_string());
    std::fs::remove_file(&path).ok();
}
