//! Price series store: per-asset daily closes, derived returns and CSV loading.

pub mod loader;
pub mod series;

pub use loader::{load, load_assets, PRICE_FILE_SUFFIX};
pub use series::PriceSeries;
