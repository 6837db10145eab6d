use std::fmt;
use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::{ClientProfile, ReclaimError, ReturnPeriod, format_amount};
use crate::engine::PipelineOutput;

/// Direction of a net VAT position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnStatus {
    RefundDue,
    PaymentDue,
}

impl ReturnStatus {
    /// Negative net VAT is a refund.
    pub fn of(net_vat: Decimal) -> Self {
        if net_vat < Decimal::ZERO {
            Self::RefundDue
        } else {
            Self::PaymentDue
        }
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RefundDue => f.write_str("REFUND DUE"),
            Self::PaymentDue => f.write_str("PAYMENT DUE"),
        }
    }
}

/// One numbered box of a return form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormLine {
    pub code: &'static str,
    pub label: &'static str,
    pub amount: Decimal,
}

/// VAT return filed in the declaring jurisdiction: IOSS output VAT, VAT on
/// high-value parcels that stayed there, and broker-paid import VAT to
/// deduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomesticVatReturn {
    pub period: ReturnPeriod,
    pub country: String,
    /// 1a
    pub ioss_sales_vat: Decimal,
    /// 1b
    pub ioss_returns_vat: Decimal,
    /// 1c
    pub ioss_net: Decimal,
    /// 1d: domestic high-value VAT not already paid by the broker at import.
    pub domestic_sales_vat: Decimal,
    /// 1e
    pub domestic_returns_vat: Decimal,
    /// 1f
    pub domestic_net: Decimal,
    /// 1g
    pub total_output_vat: Decimal,
    /// 2a
    pub import_vat_reclaim: Decimal,
    /// 2b
    pub total_input_vat: Decimal,
    /// 3a: output − input; negative means a refund.
    pub net_vat: Decimal,
}

impl DomesticVatReturn {
    /// Fill the return from a pipeline run.
    ///
    /// Fails for profiles without a declaring jurisdiction, which have no
    /// domestic return to file.
    pub fn prepare(
        profile: &ClientProfile,
        output: &PipelineOutput,
        period: ReturnPeriod,
    ) -> Result<Self, ReclaimError> {
        let country = profile.domestic_country().ok_or_else(|| {
            ReclaimError::Config(format!(
                "profile '{}' has no declaring jurisdiction for a domestic return",
                profile.name
            ))
        })?;

        let ioss_sales_vat = output.low_value.vat_due.total_vat();
        let ioss_returns_vat = output.low_value.vat_refund.total_vat();
        let ioss_net = ioss_sales_vat - ioss_returns_vat;

        let hv = &output.high_value;
        let domestic_sales_vat = hv.domestic_due.total_vat() - hv.broker.retained();
        let domestic_returns_vat = hv.domestic_refund.total_vat();
        let domestic_net = domestic_sales_vat - domestic_returns_vat;

        let total_output_vat = ioss_net + domestic_net;
        let import_vat_reclaim = hv.broker.reclaimable;
        let total_input_vat = import_vat_reclaim;

        Ok(Self {
            period,
            country: country.to_string(),
            ioss_sales_vat,
            ioss_returns_vat,
            ioss_net,
            domestic_sales_vat,
            domestic_returns_vat,
            domestic_net,
            total_output_vat,
            import_vat_reclaim,
            total_input_vat,
            net_vat: total_output_vat - total_input_vat,
        })
    }

    /// 3b
    pub fn status(&self) -> ReturnStatus {
        ReturnStatus::of(self.net_vat)
    }

    pub fn lines(&self) -> Vec<FormLine> {
        let line = |code: &'static str, label: &'static str, amount: Decimal| FormLine {
            code,
            label,
            amount,
        };
        vec![
            line("1a", "IOSS sales (low value), all countries", self.ioss_sales_vat),
            line("1b", "IOSS returns (credit)", self.ioss_returns_vat),
            line("1c", "IOSS net", self.ioss_net),
            line("1d", "Domestic high-value sales", self.domestic_sales_vat),
            line("1e", "Domestic high-value returns (credit)", self.domestic_returns_vat),
            line("1f", "Domestic high-value net", self.domestic_net),
            line("1g", "Total output VAT", self.total_output_vat),
            line("2a", "Import VAT to reclaim (parcels to other countries)", self.import_vat_reclaim),
            line("2b", "Total input VAT", self.total_input_vat),
            line("3a", "Output VAT - input VAT", self.net_vat),
        ]
    }

    pub fn render(&self) -> String {
        let mut out = format!("VAT RETURN {} {}\n", self.country, self.period);
        for l in self.lines() {
            let _ = writeln!(out, "{:<4}{:<52}{:>14}", l.code, l.label, format_amount(l.amount));
        }
        let _ = writeln!(out, "{:<4}{:<52}{:>14}", "3b", "Status", self.status().to_string());
        out
    }
}
