pub mod pricer;

pub use pricer::*;
