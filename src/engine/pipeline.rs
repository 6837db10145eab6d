//! The full run: classify, aggregate per regime, merge, split, settle.

use tracing::info;

use super::aggregate::{
    CountryFilter, DutyRefundTable, RegimeAggregator, VatDueTable, VatRefundTable,
};
use super::classify::{Classification, ConsignmentClassifier};
use super::merge::{NetVatRow, RefundTable, merge_refunds, net_vat_by_country};
use super::revenue::{RevenueSplitter, RevenueTable};
use super::settlement::{
    BrokerVat, SettlementCalculator, SettlementInputs, SettlementReport, broker_vat,
};
use crate::core::{ClientProfile, DataQualityWarning, DutyRateTable, LineItem, ReclaimError};

/// Low-value (IOSS) results.
#[derive(Debug, Clone, PartialEq)]
pub struct LowValueOutcome {
    pub vat_due: VatDueTable,
    pub vat_refund: VatRefundTable,
    pub net_vat: Vec<NetVatRow>,
    pub refunds: RefundTable,
    pub revenue: RevenueTable,
}

/// High-value results, split between OSS and the declaring jurisdiction.
#[derive(Debug, Clone, PartialEq)]
pub struct HighValueOutcome {
    /// Destinations other than the domestic country.
    pub oss_due: VatDueTable,
    pub oss_refund: VatRefundTable,
    pub oss_net_vat: Vec<NetVatRow>,
    /// The domestic country only; empty without a declaring jurisdiction.
    pub domestic_due: VatDueTable,
    pub domestic_refund: VatRefundTable,
    /// VAT refunds over every high-value destination.
    pub vat_refund: VatRefundTable,
    pub duty: DutyRefundTable,
    /// `vat_refund` merged with `duty`.
    pub refunds: RefundTable,
    pub revenue: RevenueTable,
    pub broker: BrokerVat,
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub classification: Classification,
    pub low_value: LowValueOutcome,
    pub high_value: HighValueOutcome,
    pub settlement: SettlementReport,
    /// Unmapped countries and goods codes, in the order found.
    pub warnings: Vec<DataQualityWarning>,
}

impl PipelineOutput {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A settlement run bound to one client profile.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    profile: &'a ClientProfile,
}

impl<'a> Pipeline<'a> {
    /// Validates the profile up front so a bad threshold or rate never
    /// reaches the arithmetic.
    pub fn new(profile: &'a ClientProfile) -> Result<Self, ReclaimError> {
        profile.validate()?;
        Ok(Self { profile })
    }

    pub fn profile(&self) -> &ClientProfile {
        self.profile
    }

    pub fn run(
        &self,
        lines: &[LineItem],
        duty_rates: &DutyRateTable,
    ) -> Result<PipelineOutput, ReclaimError> {
        let rates = &self.profile.rates;
        info!(
            "Running profile '{}' on {} line items",
            self.profile.name,
            lines.len()
        );

        let classification =
            ConsignmentClassifier::new(rates, self.profile.threshold).classify(lines)?;
        let low_value = self.low_value(&classification)?;
        let high_value = self.high_value(&classification, duty_rates)?;

        let settlement = SettlementCalculator::calculate(&SettlementInputs {
            ioss_due: &low_value.vat_due,
            ioss_refund: &low_value.vat_refund,
            oss_due: &high_value.oss_due,
            oss_refund: &high_value.oss_refund,
            domestic_refund: &high_value.domestic_refund,
            broker: high_value.broker,
            duty: &high_value.duty,
            high_value_refunds: &high_value.refunds,
            ioss_revenue: &low_value.revenue,
            high_value_revenue: &high_value.revenue,
        });

        let mut warnings = classification.warnings.clone();
        warnings.extend(high_value.duty.warnings().iter().cloned());
        if !warnings.is_empty() {
            info!("{} data-quality warnings", warnings.len());
        }

        Ok(PipelineOutput {
            classification,
            low_value,
            high_value,
            settlement,
            warnings,
        })
    }

    fn low_value(&self, classification: &Classification) -> Result<LowValueOutcome, ReclaimError> {
        let rates = &self.profile.rates;
        let aggregator = RegimeAggregator::new(rates);
        let vat_due = aggregator.vat_due(&classification.low_value);
        let vat_refund = aggregator.vat_refund(&classification.low_value);
        let net_vat = net_vat_by_country(&vat_due, &vat_refund)?;
        // No duty is reclaimed on consignments under the threshold.
        let refunds = merge_refunds(&vat_refund, &DutyRefundTable::default())?;
        let revenue = RevenueSplitter::new(rates).split(&refunds);

        info!(
            "IOSS: VAT due {} across {} countries, refunds {}",
            vat_due.total_vat(),
            vat_due.len(),
            vat_refund.total_vat()
        );
        Ok(LowValueOutcome {
            vat_due,
            vat_refund,
            net_vat,
            refunds,
            revenue,
        })
    }

    fn high_value(
        &self,
        classification: &Classification,
        duty_rates: &DutyRateTable,
    ) -> Result<HighValueOutcome, ReclaimError> {
        let rates = &self.profile.rates;
        let consignments = &classification.high_value;
        let all = RegimeAggregator::new(rates);

        let (oss_filter, domestic_filter) = match self.profile.domestic_country() {
            Some(country) => (CountryFilter::exclude(country), Some(CountryFilter::only(country))),
            None => (CountryFilter::All, None),
        };

        let oss = all.clone().with_filter(oss_filter);
        let oss_due = oss.vat_due(consignments);
        let oss_refund = oss.vat_refund(consignments);
        let oss_net_vat = net_vat_by_country(&oss_due, &oss_refund)?;

        let (domestic_due, domestic_refund) = match domestic_filter {
            Some(filter) => {
                let domestic = all.clone().with_filter(filter);
                (domestic.vat_due(consignments), domestic.vat_refund(consignments))
            }
            None => (VatDueTable::default(), VatRefundTable::default()),
        };

        let vat_refund = all.vat_refund(consignments);
        let duty = all.duty_refund(consignments, duty_rates);
        let refunds = merge_refunds(&vat_refund, &duty)?;
        let revenue = RevenueSplitter::new(rates).split(&refunds);
        let broker = broker_vat(consignments, rates, self.profile.domestic.as_ref());

        info!(
            "OSS: VAT due {} across {} countries; duty refund {}; broker reclaimable {}",
            oss_due.total_vat(),
            oss_due.len(),
            duty.total_duty(),
            broker.reclaimable
        );
        Ok(HighValueOutcome {
            oss_due,
            oss_refund,
            oss_net_vat,
            domestic_due,
            domestic_refund,
            vat_refund,
            duty,
            refunds,
            revenue,
            broker,
        })
    }
}

/// Validate `profile` and run it once.
pub fn run(
    profile: &ClientProfile,
    lines: &[LineItem],
    duty_rates: &DutyRateTable,
) -> Result<PipelineOutput, ReclaimError> {
    Pipeline::new(profile)?.run(lines, duty_rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LineItemBuilder, Threshold};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn lines() -> Vec<LineItem> {
        vec![
            // Low value, DE, no returns.
            LineItemBuilder::new("P1", "DE", 1, dec!(100))
                .consignment_ref("M1")
                .build(),
            // High value, IE, 2 of 5 returned.
            LineItemBuilder::new("P2", "IE", 5, dec!(30))
                .consignment_ref("M2")
                .goods_code("6204")
                .returned(2)
                .build(),
            LineItemBuilder::new("P3", "IE", 1, dec!(150))
                .consignment_ref("M2")
                .build(),
            // High value, stayed in NL, returned.
            LineItemBuilder::new("P4", "NL", 1, dec!(200))
                .consignment_ref("M3")
                .goods_code("6204")
                .returned(1)
                .build(),
        ]
    }

    fn duty() -> DutyRateTable {
        DutyRateTable::from_entries([("6204", Some(dec!(0.12)))]).unwrap()
    }

    #[test]
    fn netherlands_broker_run() {
        let out = run(&ClientProfile::netherlands_broker(), &lines(), &duty()).unwrap();
        assert_eq!(out.classification.low_value.len(), 1);
        assert_eq!(out.classification.high_value.len(), 2);

        assert_eq!(out.low_value.vat_due.vat_for("DE"), dec!(19.00));
        // NL stays out of OSS.
        assert!(out.high_value.oss_due.for_country("NL").next().is_none());
        assert_eq!(out.high_value.oss_refund.vat_for("IE"), dec!(13.80));
        assert_eq!(out.high_value.domestic_refund.vat_for("NL"), dec!(42));
        assert_eq!(out.high_value.duty.duty_for("IE"), Decimal::ZERO);
        assert_eq!(out.high_value.duty.duty_for("NL"), dec!(24));

        let ie = out.high_value.revenue.get("IE").unwrap();
        assert_eq!(ie.revenue, dec!(4.14));
        assert_eq!(ie.counterparty_share, dec!(9.66));

        // Broker: (300 + 200) × 0.21 paid, 300 × 0.21 reclaimable.
        assert_eq!(out.high_value.broker.paid, dec!(105));
        assert_eq!(out.high_value.broker.reclaimable, dec!(63));

        let s = &out.settlement;
        assert_eq!(s.net_ioss, dec!(19));
        // 300 × 0.23 − 13.80
        assert_eq!(s.net_oss, dec!(55.20));
        // NL refund 42 + duty 24 = 66 at 20%, IE 13.80 at 30%.
        assert_eq!(s.total_commission, dec!(17.34));
        assert_eq!(s.invoice_amount, dec!(19) + dec!(55.20) - dec!(42) + dec!(17.34));
        assert_eq!(s.payback_amount, dec!(24) + dec!(63));
        assert!(!out.has_warnings());
    }

    #[test]
    fn direct_profile_puts_everything_through_oss() {
        let out = run(&ClientProfile::direct(), &lines(), &duty()).unwrap();
        assert_eq!(out.high_value.oss_due.vat_for("NL"), dec!(42));
        assert!(out.high_value.domestic_due.is_empty());
        assert_eq!(out.high_value.broker, BrokerVat::default());
        assert_eq!(out.settlement.payback_amount, dec!(24));
    }

    #[test]
    fn rejects_invalid_profile() {
        let mut profile = ClientProfile::netherlands_broker();
        profile.domestic = Some(crate::core::DomesticJurisdiction::new("XX", dec!(0.2)));
        assert!(matches!(
            Pipeline::new(&profile),
            Err(ReclaimError::Config(_))
        ));
    }

    #[test]
    fn empty_input_settles_to_zero() {
        let out = run(&ClientProfile::default(), &[], &DutyRateTable::new()).unwrap();
        assert_eq!(out.settlement.invoice_amount, Decimal::ZERO);
        assert_eq!(out.settlement.payback_amount, Decimal::ZERO);
    }

    #[test]
    fn lower_threshold_moves_consignments() {
        let profile = ClientProfile::direct().with_threshold(Threshold::new(dec!(50)).unwrap());
        let out = run(&profile, &lines(), &duty()).unwrap();
        assert!(out.classification.low_value.is_empty());
        assert_eq!(out.classification.high_value.len(), 3);
    }

    #[test]
    fn collects_warnings_from_every_stage() {
        let mut input = lines();
        input.push(
            LineItemBuilder::new("P9", "XK", 1, dec!(500))
                .goods_code("9999")
                .returned(1)
                .build(),
        );
        let out = run(&ClientProfile::direct(), &input, &duty()).unwrap();
        let keys: Vec<&str> = out.warnings.iter().map(|w| w.key()).collect();
        assert_eq!(keys, ["XK", "9999"]);
    }
}
