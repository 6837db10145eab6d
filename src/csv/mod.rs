//! CSV record source and report sink.
//!
//! # Example
//!
//! ```no_run
//! use dutyrefund::core::ClientProfile;
//! use dutyrefund::csv::*;
//! use dutyrefund::engine::run;
//!
//! let profile = ClientProfile::default();
//! let (lines, _summary) = read_line_items_from_path("consignments.csv", &profile)?;
//! let duty = read_duty_rates_from_path("duty_rates.csv")?;
//! let output = run(&profile, &lines, &duty)?;
//! ReportWriter::new("reports")?.write_all(&output)?;
//! # Ok::<(), dutyrefund::core::ReclaimError>(())
//! ```

mod export;
mod ingest;

pub use export::{
    HV_DUTY_REFUNDS, HV_REFUNDS, IOSS_REFUNDS, IOSS_VAT_PER_COUNTRY, OSS_VAT_PER_COUNTRY,
    REVENUE, ReportWriter, SETTLEMENT, WARNINGS,
};
pub use ingest::{
    IngestSummary, read_duty_rates, read_duty_rates_from_path, read_line_items,
    read_line_items_from_path,
};
