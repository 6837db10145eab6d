//! Outer joins of per-country tables.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::Serialize;

use super::aggregate::{CountryAggregate, DutyRefundTable, VatDueTable, VatRefundTable};
use crate::core::ReclaimError;

/// VAT and duty refunds for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefundRow {
    pub country: String,
    /// `None` for countries present only in the duty table.
    pub vat_rate: Option<Decimal>,
    pub total_returned_value: Decimal,
    pub vat_refund: Decimal,
    pub duty_refund: Decimal,
    /// `vat_refund + duty_refund`.
    pub total_refund: Decimal,
}

/// Merged refund rows, one per country, sorted by country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefundTable {
    rows: Vec<RefundRow>,
}

impl RefundTable {
    pub fn rows(&self) -> &[RefundRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, country: &str) -> Option<&RefundRow> {
        self.rows.iter().find(|r| r.country == country)
    }

    pub fn total_vat_refund(&self) -> Decimal {
        self.rows.iter().map(|r| r.vat_refund).sum()
    }

    pub fn total_duty_refund(&self) -> Decimal {
        self.rows.iter().map(|r| r.duty_refund).sum()
    }

    pub fn total_refund(&self) -> Decimal {
        self.rows.iter().map(|r| r.total_refund).sum()
    }
}

/// Outer-join VAT refunds and duty refunds on country.
///
/// A country missing from one side gets zero for that side. Each input
/// must hold at most one row per country; anything else means an upstream
/// grouping bug and aborts the merge.
pub fn merge_refunds(
    vat: &VatRefundTable,
    duty: &DutyRefundTable,
) -> Result<RefundTable, ReclaimError> {
    ensure_unique("VAT refund", vat.rows().iter().map(|r| r.country.as_str()))?;
    ensure_unique("duty refund", duty.rows().iter().map(|r| r.country.as_str()))?;

    let mut merged: BTreeMap<&str, RefundRow> = BTreeMap::new();
    for r in vat.rows() {
        merged.insert(
            &r.country,
            RefundRow {
                country: r.country.clone(),
                vat_rate: Some(r.vat_rate),
                total_returned_value: r.total_value,
                vat_refund: r.total_vat,
                duty_refund: Decimal::ZERO,
                total_refund: Decimal::ZERO,
            },
        );
    }
    for d in duty.rows() {
        merged
            .entry(&d.country)
            .and_modify(|row| row.duty_refund = d.total_duty)
            .or_insert_with(|| RefundRow {
                country: d.country.clone(),
                vat_rate: None,
                total_returned_value: d.total_returned_value,
                vat_refund: Decimal::ZERO,
                duty_refund: d.total_duty,
                total_refund: Decimal::ZERO,
            });
    }

    let rows = merged
        .into_values()
        .map(|mut row| {
            row.total_refund = row.vat_refund + row.duty_refund;
            row
        })
        .collect();
    Ok(RefundTable { rows })
}

/// Import VAT against VAT refunds for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetVatRow {
    pub country: String,
    pub vat_rate: Decimal,
    /// Σ consignment value (taxable amount).
    pub taxable_value: Decimal,
    pub vat_due: Decimal,
    pub vat_refund: Decimal,
    /// `vat_due − vat_refund`; negative means a refund is due.
    pub net_vat: Decimal,
}

/// Outer-join a VAT-due table and a VAT-refund table on country.
pub fn net_vat_by_country(
    due: &VatDueTable,
    refund: &VatRefundTable,
) -> Result<Vec<NetVatRow>, ReclaimError> {
    ensure_unique("VAT due", due.rows().iter().map(|r| r.country.as_str()))?;
    ensure_unique("VAT refund", refund.rows().iter().map(|r| r.country.as_str()))?;

    let mut merged: BTreeMap<&str, NetVatRow> = BTreeMap::new();
    for r in due.rows() {
        merged.insert(&r.country, net_row(r, r.total_value, r.total_vat, Decimal::ZERO));
    }
    for r in refund.rows() {
        merged
            .entry(&r.country)
            .and_modify(|row| row.vat_refund = r.total_vat)
            .or_insert_with(|| net_row(r, Decimal::ZERO, Decimal::ZERO, r.total_vat));
    }
    Ok(merged
        .into_values()
        .map(|mut row| {
            row.net_vat = row.vat_due - row.vat_refund;
            row
        })
        .collect())
}

fn net_row(r: &CountryAggregate, taxable: Decimal, due: Decimal, refund: Decimal) -> NetVatRow {
    NetVatRow {
        country: r.country.clone(),
        vat_rate: r.vat_rate,
        taxable_value: taxable,
        vat_due: due,
        vat_refund: refund,
        net_vat: Decimal::ZERO,
    }
}

fn ensure_unique<'a>(
    table: &str,
    countries: impl Iterator<Item = &'a str>,
) -> Result<(), ReclaimError> {
    let mut seen = BTreeSet::new();
    for country in countries {
        if !seen.insert(country) {
            return Err(ReclaimError::Structural(format!(
                "{table} table has more than one row for {country}"
            )));
        }
    }
    Ok(())
}
