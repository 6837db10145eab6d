//! # dutyrefund
//!
//! VAT and customs-duty settlement for cross-border e-commerce
//! consignments: low-value parcels under IOSS, high-value parcels under
//! OSS or a domestic declaring jurisdiction, refunds on returns, and the
//! net amount owed between the reclaim agent and its counterparty.
//!
//! All monetary values use [`rust_decimal::Decimal`]; never floating point.
//! Nothing in the engine rounds. Amounts are rounded to cents only when
//! rendered.
//!
//! ## Quick Start
//!
//! ```rust
//! use dutyrefund::core::*;
//! use dutyrefund::engine::run;
//! use rust_decimal_macros::dec;
//!
//! let lines = vec![
//!     LineItemBuilder::new("P1", "DE", 1, dec!(100)).consignment_ref("MRN1").build(),
//!     LineItemBuilder::new("P2", "IE", 5, dec!(30)).consignment_ref("MRN2").returned(2).build(),
//!     LineItemBuilder::new("P3", "IE", 1, dec!(150)).consignment_ref("MRN2").build(),
//! ];
//!
//! let output = run(&ClientProfile::default(), &lines, &DutyRateTable::new()).unwrap();
//!
//! assert_eq!(output.low_value.vat_due.vat_for("DE"), dec!(19.00));
//! assert_eq!(output.high_value.vat_refund.vat_for("IE"), dec!(13.80));
//! let ie = output.high_value.revenue.get("IE").unwrap();
//! assert_eq!(ie.revenue, dec!(4.14));
//! assert_eq!(ie.counterparty_share, dec!(9.66));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Line items, consignments, rate tables, client profiles |
//! | `engine` (default) | Classification, aggregation, refunds, commission, settlement |
//! | `forms` | Domestic VAT return, OSS return, duty claim, VAT difference |
//! | `csv` | CSV record source and report sink |
//! | `json` | Client profiles as JSON |
//! | `all` | Everything above |
//! | `cli` | The `dutyrefund` binary |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "engine")]
pub mod engine;

#[cfg(feature = "forms")]
pub mod forms;

#[cfg(feature = "csv")]
pub mod csv;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
