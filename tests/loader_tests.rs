
use cryptovix::{load, load_assets, VixError};
use test_utils::{date, BROKEN_CSV, DATA_DIR, FLAT_CSV, TOY_CSV, WAVY_CSV};

#[test]
fn test_newest_first_file_is_sorted() {
    let series = load("TOY", TOY_CSV).expect("toy loads");
    assert_eq!(series.name(), "TOY");
    assert_eq!(
        series.dates(),
        &[date(2021, 1, 1), date(2021, 1, 2), date(2021, 1, 3)]
    );
    assert_eq!(series.closes(), &[100.0, 105.0, 100.0]);
    assert!(series.returns()[0].is_nan());
    assert!((series.returns()[1] - 0.05).abs() < 1e-12);
    assert!((series.returns()[2] - (100.0 / 105.0 - 1.0)).abs() < 1e-12);
    assert_eq!(series.pct_return(date(2021, 1, 1)), None);
}

#[test]
fn test_thousands_separators_and_iso_dates() {
    let series = load("FLAT", FLAT_CSV).expect("flat loads");
    assert_eq!(series.len(), 75);
    assert_eq!(series.first_date(), date(2020, 3, 1));
    assert!(series.closes().iter().all(|&c| c == 1000.0));
}

#[test]
fn test_lowercase_headers_and_us_dates() {
    let series = load("WAVY", WAVY_CSV).expect("wavy loads");
    assert_eq!(series.len(), 90);
    assert_eq!(series.first_date(), date(2019, 1, 1));
    assert_eq!(series.last_date(), date(2019, 3, 31));
    assert_eq!(series.close(date(2019, 1, 1)), Some(4000.0));
}

#[test]
fn test_malformed_file_reports_line() {
    let err = load("BROKEN", BROKEN_CSV).unwrap_err();
    match err {
        VixError::DataLoad { path, message } => {
            assert!(path.ends_with("broken.csv"));
            assert!(message.contains("line 3"), "{message}");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_missing_file_and_columns() {
    assert!(matches!(
        load("NONE", "tests/data/does_not_exist.csv"),
        Err(VixError::DataLoad { .. })
    ));

    let path = std::env::temp_dir().join(format!("cryptovix_{}_nocol.csv", std::process::id()));
    std::fs::write(&path, "Date,Open\n2021-01-01,1\n").unwrap();
    let err = load("NOCOL", &path).unwrap_err();
    assert!(err.to_string().contains("Close"), "{err}");
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_duplicate_dates_rejected() {
    let path = std::env::temp_dir().join(format!("cryptovix_{}_dup.csv", std::process::id()));
    std::fs::write(&path, "Date,Close\n2021-01-01,1\n2021-01-02,2\n2021-01-01,3\n").unwrap();
    assert!(matches!(load("DUP", &path), Err(VixError::DataLoad { .. })));
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_directory_load_uses_file_prefix() {
    let assets = load_assets(DATA_DIR).expect("directory loads");
    let names: Vec<&str> = assets.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["flat", "toy", "wavy"]);
    assert_eq!(assets["toy"].len(), 3);
}
