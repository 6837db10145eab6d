//! Core types: line items, consignments, country policy and run profiles.
//!
//! Everything here is read-only data. The engine consumes it; nothing in
//! this module computes a tax figure beyond single-line arithmetic.

mod builder;
pub mod countries;
mod duty;
mod error;
mod money;
mod period;
mod profile;
mod rates;
mod types;

pub use builder::*;
pub use countries::{is_eu_member, normalize_country};
pub use duty::*;
pub use error::*;
pub use money::*;
pub use period::*;
pub use profile::*;
pub use rates::*;
pub use types::*;
