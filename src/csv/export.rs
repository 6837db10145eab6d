//! Report sink: one CSV file per output table.

use std::path::{Path, PathBuf};

use ::csv::Writer;
use tracing::info;

use crate::core::{DataQualityWarning, ReclaimError, format_amount};
use crate::engine::{
    AggregateTable, DutyRefundTable, PipelineOutput, RefundTable, RevenueTable, SettlementReport,
};

pub const IOSS_VAT_PER_COUNTRY: &str = "IOSS_VAT_PER_COUNTRY.csv";
pub const IOSS_REFUNDS: &str = "IOSS_REFUNDS.csv";
pub const OSS_VAT_PER_COUNTRY: &str = "OSS_VAT_PER_COUNTRY.csv";
pub const HV_REFUNDS: &str = "HV_REFUNDS.csv";
pub const HV_DUTY_REFUNDS: &str = "HV_DUTY_REFUNDS.csv";
pub const REVENUE: &str = "REVENUE.csv";
pub const SETTLEMENT: &str = "SETTLEMENT.csv";
pub const WARNINGS: &str = "WARNINGS.csv";

/// Writes pipeline tables as CSV files into one directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Creates `dir` (and parents) if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ReclaimError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write every table of a run; returns the paths written.
    pub fn write_all(&self, output: &PipelineOutput) -> Result<Vec<PathBuf>, ReclaimError> {
        let paths = vec![
            self.write_vat_table(IOSS_VAT_PER_COUNTRY, &output.low_value.vat_due)?,
            self.write_refunds(IOSS_REFUNDS, &output.low_value.refunds)?,
            self.write_vat_table(OSS_VAT_PER_COUNTRY, &output.high_value.oss_due)?,
            self.write_refunds(HV_REFUNDS, &output.high_value.refunds)?,
            self.write_duty(HV_DUTY_REFUNDS, &output.high_value.duty)?,
            self.write_revenue(REVENUE, &output.low_value.revenue, &output.high_value.revenue)?,
            self.write_settlement(SETTLEMENT, &output.settlement)?,
            self.write_warnings(WARNINGS, &output.warnings)?,
        ];
        info!("Wrote {} report files to {}", paths.len(), self.dir.display());
        Ok(paths)
    }

    pub fn write_vat_table<K>(
        &self,
        name: &str,
        table: &AggregateTable<K>,
    ) -> Result<PathBuf, ReclaimError> {
        self.write(name, |w| {
            w.write_record(["country", "vat_rate", "total_value", "total_vat"])?;
            for r in table.rows() {
                w.write_record([
                    r.country.as_str(),
                    &r.vat_rate.normalize().to_string(),
                    &format_amount(r.total_value),
                    &format_amount(r.total_vat),
                ])?;
            }
            Ok(())
        })
    }

    pub fn write_refunds(&self, name: &str, table: &RefundTable) -> Result<PathBuf, ReclaimError> {
        self.write(name, |w| {
            w.write_record([
                "country",
                "vat_rate",
                "total_returned_value",
                "vat_refund",
                "duty_refund",
                "total_refund",
            ])?;
            for r in table.rows() {
                let rate = r.vat_rate.map(|v| v.normalize().to_string()).unwrap_or_default();
                w.write_record([
                    r.country.as_str(),
                    &rate,
                    &format_amount(r.total_returned_value),
                    &format_amount(r.vat_refund),
                    &format_amount(r.duty_refund),
                    &format_amount(r.total_refund),
                ])?;
            }
            Ok(())
        })
    }

    pub fn write_duty(&self, name: &str, table: &DutyRefundTable) -> Result<PathBuf, ReclaimError> {
        self.write(name, |w| {
            w.write_record(["country", "total_returned_value", "total_duty"])?;
            for r in table.rows() {
                w.write_record([
                    r.country.as_str(),
                    &format_amount(r.total_returned_value),
                    &format_amount(r.total_duty),
                ])?;
            }
            Ok(())
        })
    }

    /// Both regimes in one file, tagged by regime.
    pub fn write_revenue(
        &self,
        name: &str,
        low_value: &RevenueTable,
        high_value: &RevenueTable,
    ) -> Result<PathBuf, ReclaimError> {
        self.write(name, |w| {
            w.write_record([
                "regime",
                "country",
                "total_refund",
                "commission_rate",
                "revenue",
                "counterparty_share",
            ])?;
            for (regime, table) in [("IOSS", low_value), ("HV", high_value)] {
                for r in table.rows() {
                    w.write_record([
                        regime,
                        r.country.as_str(),
                        &format_amount(r.total_refund),
                        &r.commission_rate.normalize().to_string(),
                        &format_amount(r.revenue),
                        &format_amount(r.counterparty_share),
                    ])?;
                }
            }
            Ok(())
        })
    }

    pub fn write_settlement(
        &self,
        name: &str,
        report: &SettlementReport,
    ) -> Result<PathBuf, ReclaimError> {
        self.write(name, |w| {
            w.write_record(["label", "amount", "description"])?;
            for l in report.lines() {
                w.write_record([l.label, &format_amount(l.amount), l.description])?;
            }
            Ok(())
        })
    }

    pub fn write_warnings(
        &self,
        name: &str,
        warnings: &[DataQualityWarning],
    ) -> Result<PathBuf, ReclaimError> {
        self.write(name, |w| {
            w.write_record(["kind", "key", "occurrences", "message"])?;
            for warning in warnings {
                let kind = match warning {
                    DataQualityWarning::UnmappedCountry { .. } => "unmapped_country",
                    DataQualityWarning::UnmappedGoodsCode { .. } => "unmapped_goods_code",
                };
                w.write_record([
                    kind,
                    warning.key(),
                    &warning.occurrences().to_string(),
                    &warning.to_string(),
                ])?;
            }
            Ok(())
        })
    }

    fn write<F>(&self, name: &str, body: F) -> Result<PathBuf, ReclaimError>
    where
        F: FnOnce(&mut Writer<std::fs::File>) -> Result<(), ::csv::Error>,
    {
        let path = self.dir.join(name);
        let report_error = |e: ::csv::Error| ReclaimError::Report(format!("{}: {e}", path.display()));
        let mut writer = Writer::from_path(&path).map_err(report_error)?;
        body(&mut writer).map_err(report_error)?;
        writer.flush()?;
        Ok(path)
    }
}
