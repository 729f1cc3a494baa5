use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::data::series::PriceSeries;
use crate::error::{Result, VixError};

/// File-name suffix of per-asset price files (`btc_price.csv`).
pub const PRICE_FILE_SUFFIX: &str = "_price.csv";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y", "%d-%b-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Load one asset's daily closes from a CSV file.
///
/// The file needs a header row containing a `Date` and a `Close` column
/// (matched case-insensitively, other columns are ignored). Rows may run in
/// either date order.
pub fn load(asset_name: &str, path: impl AsRef<Path>) -> Result<PriceSeries> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| VixError::data_load(path, e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| VixError::data_load(path, e.to_string()))?
        .clone();
    let date_col = find_column(&headers, "date")
        .ok_or_else(|| VixError::data_load(path, "missing 'Date' column"))?;
    let close_col = find_column(&headers, "close")
        .ok_or_else(|| VixError::data_load(path, "missing 'Close' column"))?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| VixError::data_load(path, e.to_string()))?;
        // header is line 1
        let line = line + 2;

        let raw_date = record.get(date_col).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| {
            VixError::data_load(path, format!("line {line}: unparsable date '{raw_date}'"))
        })?;

        let raw_close = record.get(close_col).unwrap_or_default();
        let close = parse_price(raw_close).ok_or_else(|| {
            VixError::data_load(path, format!("line {line}: unparsable close '{raw_close}'"))
        })?;

        rows.push((date, close));
    }

    let series = PriceSeries::new(asset_name, rows).map_err(|e| match e {
        VixError::InvalidInput(message) => VixError::data_load(path, message),
        other => other,
    })?;

    tracing::debug!(
        asset = asset_name,
        rows = series.len(),
        first = %series.first_date(),
        last = %series.last_date(),
        "price series loaded"
    );
    Ok(series)
}

/// Load every `<asset>_price.csv` in `dir`, keyed by asset name.
///
/// The asset name is the file name up to the first underscore.
pub fn load_assets(dir: impl AsRef<Path>) -> Result<BTreeMap<String, PriceSeries>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| VixError::data_load(dir, e.to_string()))?;

    let mut assets = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|e| VixError::data_load(dir, e.to_string()))?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if !file_name.ends_with(PRICE_FILE_SUFFIX) {
            continue;
        }
        let asset = file_name.split('_').next().unwrap_or(file_name).to_string();
        let series = load(&asset, entry.path())?;
        assets.insert(asset, series);
    }

    tracing::info!(dir = %dir.display(), assets = assets.len(), "asset directory loaded");
    Ok(assets)
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '$').collect();
    cleaned.parse::<f64>().ok()
}
