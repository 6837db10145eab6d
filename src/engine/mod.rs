//! Settlement engine.
//!
//! Data flows one way: line items are grouped and classified, each regime
//! is aggregated per country, refunds are merged and split by commission,
//! and the results fold into a [`SettlementReport`]. Every stage is a pure
//! function of its inputs and the injected [`ClientProfile`](crate::core::ClientProfile).

mod aggregate;
mod classify;
mod merge;
mod pipeline;
mod revenue;
mod settlement;

pub use aggregate::*;
pub use classify::*;
pub use merge::*;
pub use pipeline::*;
pub use revenue::*;
pub use settlement::*;
