pub mod bootstrap;
pub mod empirical;
pub mod vix;
