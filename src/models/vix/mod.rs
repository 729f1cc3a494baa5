//! Volatility index from empirically priced option strips.
//!
//! Two strips are built per evaluation date (near and next maturity). Each
//! gets a variance estimate in the CBOE style; the index is
//! `100 * sqrt(T_near var_near + T_next var_next)`.

pub mod index;
pub mod strip;

pub use index::*;
pub use strip::*;
