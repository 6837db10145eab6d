//! Net settlement between the reclaim agent and the counterparty.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use super::aggregate::{
    CountryFilter, DutyRefundTable, RegimeAggregator, VatDueTable, VatRateSource, VatRefundTable,
};
use super::merge::RefundTable;
use super::revenue::RevenueTable;
use crate::core::{Consignment, DomesticJurisdiction, RateTable, format_amount};

/// Import VAT a domestic broker paid on high-value consignments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BrokerVat {
    /// On every high-value consignment, at the domestic rate.
    pub paid: Decimal,
    /// The part for consignments that left the domestic country.
    pub reclaimable: Decimal,
}

impl BrokerVat {
    /// Paid on consignments that stayed in the domestic country.
    pub fn retained(&self) -> Decimal {
        self.paid - self.reclaimable
    }
}

/// Split broker-paid import VAT into reclaimable and retained parts.
///
/// Zero when there is no declaring jurisdiction.
pub fn broker_vat(
    high_value: &[Consignment],
    rates: &RateTable,
    domestic: Option<&DomesticJurisdiction>,
) -> BrokerVat {
    let Some(domestic) = domestic else {
        return BrokerVat::default();
    };
    let at_domestic_rate =
        RegimeAggregator::new(rates).with_rate_source(VatRateSource::Fixed(domestic.vat_rate));
    let paid = at_domestic_rate.vat_due(high_value).total_vat();
    let reclaimable = at_domestic_rate
        .with_filter(CountryFilter::exclude(&domestic.country))
        .vat_due(high_value)
        .total_vat();
    BrokerVat { paid, reclaimable }
}

/// Aggregates a settlement is computed from. Empty tables count as zero.
#[derive(Debug, Clone, Copy)]
pub struct SettlementInputs<'a> {
    pub ioss_due: &'a VatDueTable,
    pub ioss_refund: &'a VatRefundTable,
    pub oss_due: &'a VatDueTable,
    pub oss_refund: &'a VatRefundTable,
    /// VAT refunds on returned consignments that stayed in the domestic
    /// country.
    pub domestic_refund: &'a VatRefundTable,
    pub broker: BrokerVat,
    pub duty: &'a DutyRefundTable,
    /// High-value VAT refunds (all destinations) merged with duty refunds.
    pub high_value_refunds: &'a RefundTable,
    pub ioss_revenue: &'a RevenueTable,
    pub high_value_revenue: &'a RevenueTable,
}

/// Final settlement figures for one period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettlementReport {
    pub ioss_sales_vat: Decimal,
    pub ioss_returns_vat: Decimal,
    pub net_ioss: Decimal,
    pub oss_sales_vat: Decimal,
    pub oss_returns_vat: Decimal,
    pub net_oss: Decimal,
    pub broker_paid_vat: Decimal,
    pub broker_reclaimable_vat: Decimal,
    pub domestic_vat_return: Decimal,
    pub high_value_vat_refund: Decimal,
    pub total_duty_refund: Decimal,
    pub total_refunds: Decimal,
    pub total_commission: Decimal,
    /// Billed to the counterparty.
    pub invoice_amount: Decimal,
    /// Owed back to the counterparty.
    pub payback_amount: Decimal,
}

/// One labelled amount of the settlement statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementLine {
    pub label: &'static str,
    pub amount: Decimal,
    pub description: &'static str,
}

pub struct SettlementCalculator;

impl SettlementCalculator {
    /// `invoice = net IOSS + net OSS − domestic VAT return + commission`,
    /// `payback = duty refund + reclaimable broker VAT`.
    ///
    /// A negative net position is a refund due, and stays negative.
    pub fn calculate(inputs: &SettlementInputs<'_>) -> SettlementReport {
        let ioss_sales_vat = inputs.ioss_due.total_vat();
        let ioss_returns_vat = inputs.ioss_refund.total_vat();
        let net_ioss = ioss_sales_vat - ioss_returns_vat;

        let oss_sales_vat = inputs.oss_due.total_vat();
        let oss_returns_vat = inputs.oss_refund.total_vat();
        let net_oss = oss_sales_vat - oss_returns_vat;

        let domestic_vat_return = inputs.domestic_refund.total_vat();
        let high_value_vat_refund = inputs.high_value_refunds.total_vat_refund();
        let total_duty_refund = inputs.duty.total_duty();
        let total_refunds = ioss_returns_vat + inputs.high_value_refunds.total_refund();
        let total_commission =
            inputs.ioss_revenue.total_revenue() + inputs.high_value_revenue.total_revenue();

        let invoice_amount = net_ioss + net_oss - domestic_vat_return + total_commission;
        let payback_amount = total_duty_refund + inputs.broker.reclaimable;

        info!(
            "Settlement: invoice {} / payback {}",
            format_amount(invoice_amount),
            format_amount(payback_amount)
        );

        SettlementReport {
            ioss_sales_vat,
            ioss_returns_vat,
            net_ioss,
            oss_sales_vat,
            oss_returns_vat,
            net_oss,
            broker_paid_vat: inputs.broker.paid,
            broker_reclaimable_vat: inputs.broker.reclaimable,
            domestic_vat_return,
            high_value_vat_refund,
            total_duty_refund,
            total_refunds,
            total_commission,
            invoice_amount,
            payback_amount,
        }
    }
}

impl SettlementReport {
    /// Statement rows in presentation order.
    pub fn lines(&self) -> Vec<SettlementLine> {
        let line = |label: &'static str, amount: Decimal, description: &'static str| SettlementLine {
            label,
            amount,
            description,
        };
        vec![
            line("IOSS sales VAT", self.ioss_sales_vat, "VAT due on low-value consignments"),
            line("IOSS returns VAT", self.ioss_returns_vat, "VAT refund on low-value returns"),
            line("Net IOSS", self.net_ioss, "IOSS sales VAT minus returns VAT"),
            line("OSS sales VAT", self.oss_sales_vat, "VAT due on non-domestic high-value consignments"),
            line("OSS returns VAT", self.oss_returns_vat, "VAT refund on non-domestic high-value returns"),
            line("Net OSS", self.net_oss, "OSS sales VAT minus returns VAT"),
            line("Broker paid VAT", self.broker_paid_vat, "Import VAT paid by the broker on high-value consignments"),
            line("Broker reclaimable VAT", self.broker_reclaimable_vat, "Broker-paid VAT on consignments shipped abroad"),
            line("Domestic VAT return", self.domestic_vat_return, "VAT refund on returned domestic consignments"),
            line("High-value VAT refund", self.high_value_vat_refund, "VAT refund on all high-value returns"),
            line("Total duty refund", self.total_duty_refund, "Customs duty refund on returns"),
            line("Total refunds", self.total_refunds, "All VAT and duty refunds"),
            line("Total commission", self.total_commission, "Reclaim agent's share of refunds"),
            line("Invoice amount", self.invoice_amount, "Net IOSS + net OSS - domestic VAT return + commission"),
            line("Payback amount", self.payback_amount, "Duty refund + reclaimable broker VAT"),
        ]
    }

    /// Plain-text statement, amounts at two decimals.
    pub fn render(&self) -> String {
        let mut out = String::from("SETTLEMENT\n");
        for l in self.lines() {
            let _ = writeln!(out, "{:<24}{:>14}", l.label, format_amount(l.amount));
        }
        out
    }
}
