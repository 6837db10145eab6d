use std::fmt::Write as _;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::{ClientProfile, ReturnPeriod, format_amount};
use crate::engine::{NetVatRow, PipelineOutput};

/// One member state of consumption on the OSS return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OssReturnRow {
    pub country: String,
    pub vat_rate: Decimal,
    /// Excluding VAT.
    pub taxable_amount: Decimal,
    pub sales_vat: Decimal,
    /// Credit for returns.
    pub returns_vat: Decimal,
    pub net_vat_due: Decimal,
}

impl From<&NetVatRow> for OssReturnRow {
    fn from(row: &NetVatRow) -> Self {
        Self {
            country: row.country.clone(),
            vat_rate: row.vat_rate,
            taxable_amount: row.taxable_value,
            sales_vat: row.vat_due,
            returns_vat: row.vat_refund,
            net_vat_due: row.net_vat,
        }
    }
}

/// Quarterly OSS return for high-value sales to other member states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OssReturn {
    pub period: ReturnPeriod,
    /// Member state of identification; `None` when no declaring
    /// jurisdiction is configured.
    pub member_state: Option<String>,
    pub rows: Vec<OssReturnRow>,
}

impl OssReturn {
    /// Rows come from the OSS net-VAT join, which never contains the
    /// domestic country.
    pub fn prepare(profile: &ClientProfile, output: &PipelineOutput, period: ReturnPeriod) -> Self {
        let member_state = profile.domestic_country().map(str::to_string);
        let rows = output
            .high_value
            .oss_net_vat
            .iter()
            .filter(|r| member_state.as_deref() != Some(r.country.as_str()))
            .map(OssReturnRow::from)
            .collect();
        Self {
            period,
            member_state,
            rows,
        }
    }

    pub fn total_sales_vat(&self) -> Decimal {
        self.rows.iter().map(|r| r.sales_vat).sum()
    }

    pub fn total_returns_vat(&self) -> Decimal {
        self.rows.iter().map(|r| r.returns_vat).sum()
    }

    pub fn net_vat_due(&self) -> Decimal {
        self.rows.iter().map(|r| r.net_vat_due).sum()
    }

    /// Last day of the month following the quarter.
    pub fn payment_deadline(&self) -> NaiveDate {
        self.period.payment_deadline()
    }

    pub fn render(&self) -> String {
        let mut out = format!("OSS RETURN {}\n", self.period);
        let _ = writeln!(
            out,
            "{:<8}{:>8}{:>16}{:>14}{:>14}{:>14}",
            "Country", "Rate", "Taxable", "Sales VAT", "Returns VAT", "Net VAT"
        );
        for r in &self.rows {
            let _ = writeln!(
                out,
                "{:<8}{:>8}{:>16}{:>14}{:>14}{:>14}",
                r.country,
                r.vat_rate.normalize().to_string(),
                format_amount(r.taxable_amount),
                format_amount(r.sales_vat),
                format_amount(r.returns_vat),
                format_amount(r.net_vat_due)
            );
        }
        let _ = writeln!(out, "Total sales VAT: {}", format_amount(self.total_sales_vat()));
        let _ = writeln!(out, "Total returns VAT: {}", format_amount(self.total_returns_vat()));
        let _ = writeln!(out, "Net OSS VAT due: {}", format_amount(self.net_vat_due()));
        let _ = writeln!(out, "Payment deadline: {}", self.payment_deadline());
        if let Some(state) = &self.member_state {
            let _ = writeln!(out, "Member state of identification: {state}");
        }
        out
    }
}
