//! Commission split of refunds between the reclaim agent and the counterparty.

use rust_decimal::Decimal;
use serde::Serialize;

use super::merge::RefundTable;
use crate::core::RateTable;

/// Commission earned on one country's refunds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenueRow {
    pub country: String,
    pub total_refund: Decimal,
    pub commission_rate: Decimal,
    /// Agent's share: `total_refund × commission_rate`.
    pub revenue: Decimal,
    /// Remainder: `total_refund − revenue`.
    pub counterparty_share: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevenueTable {
    rows: Vec<RevenueRow>,
}

impl RevenueTable {
    pub fn rows(&self) -> &[RevenueRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, country: &str) -> Option<&RevenueRow> {
        self.rows.iter().find(|r| r.country == country)
    }

    pub fn total_refund(&self) -> Decimal {
        self.rows.iter().map(|r| r.total_refund).sum()
    }

    pub fn total_revenue(&self) -> Decimal {
        self.rows.iter().map(|r| r.revenue).sum()
    }

    pub fn total_counterparty_share(&self) -> Decimal {
        self.rows.iter().map(|r| r.counterparty_share).sum()
    }
}

/// Applies the per-country commission rate to merged refunds.
#[derive(Debug, Clone, Copy)]
pub struct RevenueSplitter<'a> {
    rates: &'a RateTable,
}

impl<'a> RevenueSplitter<'a> {
    pub fn new(rates: &'a RateTable) -> Self {
        Self { rates }
    }

    /// One revenue row per refund row, in the same order.
    ///
    /// The counterparty share is the remainder, so revenue and share always
    /// add back up to the refund exactly.
    pub fn split(&self, refunds: &RefundTable) -> RevenueTable {
        let rows = refunds
            .rows()
            .iter()
            .map(|r| {
                let commission_rate = self.rates.commission_rate(&r.country);
                let revenue = r.total_refund * commission_rate;
                RevenueRow {
                    country: r.country.clone(),
                    total_refund: r.total_refund,
                    commission_rate,
                    revenue,
                    counterparty_share: r.total_refund - revenue,
                }
            })
            .collect();
        RevenueTable { rows }
    }
}
