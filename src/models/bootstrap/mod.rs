//! Bootstrap path simulation from historical daily returns.

pub mod paths;

pub use paths::*;
