//! Ratefold Common Types
//!
//! This crate contains the types shared between the rate aggregation core and
//! the HTTP shell: normalized currency codes, cache keys and aggregated rate
//! results.

pub mod currency;
pub mod rates;
pub mod error;

pub use currency::*;
pub use rates::*;
pub use error::*;
