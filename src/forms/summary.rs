use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::Serialize;

use super::domestic::DomesticVatReturn;
use super::oss::OssReturn;
use crate::core::{ClientProfile, ReturnPeriod, format_amount};
use crate::engine::PipelineOutput;

/// Headline figures across all returns for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancialSummary {
    pub period: ReturnPeriod,
    /// Σ net VAT due on the OSS return.
    pub oss_vat_due: Decimal,
    /// Net position of the domestic return (3a); zero without a declaring
    /// jurisdiction.
    pub domestic_net_vat: Decimal,
    /// Duty refunds less the agent's commission on them.
    pub duty_to_counterparty: Decimal,
}

impl FinancialSummary {
    pub fn prepare(profile: &ClientProfile, output: &PipelineOutput, period: ReturnPeriod) -> Self {
        let oss_vat_due = OssReturn::prepare(profile, output, period).net_vat_due();
        let domestic_net_vat = DomesticVatReturn::prepare(profile, output, period)
            .map(|form| form.net_vat)
            .unwrap_or(Decimal::ZERO);
        let duty_to_counterparty = output
            .high_value
            .duty
            .rows()
            .iter()
            .map(|r| r.total_duty * profile.rates.counterparty_rate(&r.country))
            .sum();
        Self {
            period,
            oss_vat_due,
            domestic_net_vat,
            duty_to_counterparty,
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!("FINANCIAL SUMMARY {}\n", self.period);
        let _ = writeln!(out, "{:<32}{:>14}", "OSS VAT due", format_amount(self.oss_vat_due));
        let _ = writeln!(out, "{:<32}{:>14}", "Domestic net VAT", format_amount(self.domestic_net_vat));
        let _ = writeln!(
            out,
            "{:<32}{:>14}",
            "Duty returned to counterparty",
            format_amount(self.duty_to_counterparty)
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DutyRateTable, LineItemBuilder};
    use crate::engine::run;
    use rust_decimal_macros::dec;

    #[test]
    fn duty_net_of_commission() {
        let profile = ClientProfile::netherlands_broker();
        let lines = vec![
            LineItemBuilder::new("P1", "DE", 1, dec!(500))
                .goods_code("6403")
                .returned(1)
                .build(),
            LineItemBuilder::new("P2", "PT", 1, dec!(50)).build(),
        ];
        let duty = DutyRateTable::from_entries([("6403", Some(dec!(0.08)))]).unwrap();
        let out = run(&profile, &lines, &duty).unwrap();
        let summary = FinancialSummary::prepare(&profile, &out, ReturnPeriod::new(2024, 4).unwrap());
        // 500 × 0.08 × (1 − 0.20)
        assert_eq!(summary.duty_to_counterparty, dec!(32));
        // DE sold and fully returned.
        assert_eq!(summary.oss_vat_due, Decimal::ZERO);
        // IOSS 11.50 − reclaimable 105
        assert_eq!(summary.domestic_net_vat, dec!(11.50) - dec!(105));
        assert!(summary.render().contains("Duty returned to counterparty"));
    }

    #[test]
    fn direct_profile_has_zero_domestic_position() {
        let profile = ClientProfile::direct();
        let out = run(&profile, &[], &DutyRateTable::new()).unwrap();
        let summary = FinancialSummary::prepare(&profile, &out, ReturnPeriod::new(2024, 1).unwrap());
        assert_eq!(summary.domestic_net_vat, Decimal::ZERO);
        assert_eq!(summary.duty_to_counterparty, Decimal::ZERO);
    }
}
