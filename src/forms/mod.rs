//! Quarterly return forms prepared from a pipeline run.
//!
//! # Example
//!
//! ```
//! use dutyrefund::core::*;
//! use dutyrefund::engine::run;
//! use dutyrefund::forms::*;
//! use rust_decimal_macros::dec;
//!
//! let profile = ClientProfile::netherlands_broker();
//! let lines = vec![LineItemBuilder::new("P1", "DE", 1, dec!(100)).build()];
//! let output = run(&profile, &lines, &DutyRateTable::new()).unwrap();
//!
//! let period: ReturnPeriod = "Q3 2024".parse().unwrap();
//! let domestic = DomesticVatReturn::prepare(&profile, &output, period).unwrap();
//! assert_eq!(domestic.ioss_sales_vat, dec!(19));
//! assert_eq!(domestic.status(), ReturnStatus::PaymentDue);
//! ```

mod difference;
mod domestic;
mod duty_claim;
mod oss;
mod summary;

pub use difference::{DifferenceSettlement, VatDifference, VatDifferenceRow};
pub use domestic::{DomesticVatReturn, FormLine, ReturnStatus};
pub use duty_claim::{DutyClaimRow, DutyReturnClaim};
pub use oss::{OssReturn, OssReturnRow};
pub use summary::FinancialSummary;
