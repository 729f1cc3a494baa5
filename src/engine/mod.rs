//! Configuration, result types and the series pipeline.

pub mod config;
pub mod pipeline;
pub mod types;

pub use config::{linspace, SamplingMode, TermConfig, VixConfig};
pub use pipeline::*;
pub use types::*;
