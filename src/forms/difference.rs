use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::{DomesticJurisdiction, round_half_up};
use crate::engine::VatDueTable;

/// VAT the broker paid at the domestic rate against VAT owed at the
/// destination rate, for one OSS country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VatDifferenceRow {
    pub country: String,
    pub destination_rate: Decimal,
    pub total_value: Decimal,
    pub vat_paid_domestic: Decimal,
    pub vat_paid_destination: Decimal,
}

impl VatDifferenceRow {
    pub fn difference(&self) -> Decimal {
        self.vat_paid_domestic - self.vat_paid_destination
    }
}

/// Who settles the rate difference, and how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DifferenceSettlement {
    AgentOwesCounterparty(Decimal),
    CounterpartyOwesAgent(Decimal),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VatDifference {
    pub domestic_country: String,
    pub domestic_rate: Decimal,
    pub rows: Vec<VatDifferenceRow>,
}

impl VatDifference {
    /// One row per OSS VAT-due row.
    pub fn compute(oss_due: &VatDueTable, domestic: &DomesticJurisdiction) -> Self {
        let rows = oss_due
            .rows()
            .iter()
            .map(|r| VatDifferenceRow {
                country: r.country.clone(),
                destination_rate: r.vat_rate,
                total_value: r.total_value,
                vat_paid_domestic: r.total_value * domestic.vat_rate,
                vat_paid_destination: r.total_vat,
            })
            .collect();
        Self {
            domestic_country: domestic.country.clone(),
            domestic_rate: domestic.vat_rate,
            rows,
        }
    }

    pub fn total_domestic(&self) -> Decimal {
        self.rows.iter().map(|r| r.vat_paid_domestic).sum()
    }

    pub fn total_destination(&self) -> Decimal {
        self.rows.iter().map(|r| r.vat_paid_destination).sum()
    }

    /// Σ domestic − Σ destination.
    pub fn difference(&self) -> Decimal {
        self.total_domestic() - self.total_destination()
    }

    /// A positive difference means more VAT was paid domestically than is
    /// owed abroad, so the agent hands the surplus back.
    pub fn settlement(&self) -> DifferenceSettlement {
        let diff = self.difference();
        if diff > Decimal::ZERO {
            DifferenceSettlement::AgentOwesCounterparty(diff)
        } else {
            DifferenceSettlement::CounterpartyOwesAgent(diff.abs())
        }
    }

    pub fn statement(&self) -> String {
        match self.settlement() {
            DifferenceSettlement::AgentOwesCounterparty(amount) => format!(
                "The reclaim agent owes the counterparty {:.4} for VAT differences.",
                round_half_up(amount, 4)
            ),
            DifferenceSettlement::CounterpartyOwesAgent(amount) => format!(
                "The counterparty owes the reclaim agent {:.4} for VAT differences.",
                round_half_up(amount, 4)
            ),
        }
    }
}
