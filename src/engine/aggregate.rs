//! Per-country VAT and duty totals for one regime.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::{
    Consignment, DataQualityWarning, DutyRateTable, RateTable, goods_code_prefix,
    normalize_country,
};

/// Which destinations an aggregation covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CountryFilter {
    /// Every destination.
    #[default]
    All,
    /// Every destination except one (e.g. parcels already taxed at source).
    Exclude(String),
    /// A single destination.
    Only(String),
}

impl CountryFilter {
    pub fn exclude(country: &str) -> Self {
        Self::Exclude(normalize_country(country))
    }

    pub fn only(country: &str) -> Self {
        Self::Only(normalize_country(country))
    }

    pub fn admits(&self, country: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exclude(excluded) => excluded != country,
            Self::Only(only) => only == country,
        }
    }
}

/// Where the VAT rate applied to a consignment comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VatRateSource {
    /// The destination country's rate, assigned at classification.
    #[default]
    PerCountry,
    /// One rate for every row (parcels declared in a domestic jurisdiction).
    Fixed(Decimal),
}

impl VatRateSource {
    fn resolve(&self, consignment: &Consignment) -> Option<Decimal> {
        match self {
            Self::PerCountry => consignment.vat_rate,
            Self::Fixed(rate) => Some(*rate),
        }
    }
}

/// One row per (country, VAT rate) of an aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryAggregate {
    pub country: String,
    pub vat_rate: Decimal,
    /// Σ consignment value (VAT due) or Σ returned value (VAT refund).
    pub total_value: Decimal,
    /// Σ VAT to pay or Σ VAT to refund.
    pub total_vat: Decimal,
}

/// Marker for import VAT due tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Due {}

/// Marker for VAT-on-returns tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refund {}

/// Rows sorted by country then rate. The marker keeps due and refund
/// tables from being swapped at call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateTable<K> {
    rows: Vec<CountryAggregate>,
    kind: PhantomData<K>,
}

/// Import VAT owed per country: value = consignment value.
pub type VatDueTable = AggregateTable<Due>;

/// VAT refundable on returns per country: value = returned value.
pub type VatRefundTable = AggregateTable<Refund>;

impl<K> Default for AggregateTable<K> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            kind: PhantomData,
        }
    }
}

impl<K> AggregateTable<K> {
    fn from_groups(groups: BTreeMap<(String, Decimal), (Decimal, Decimal)>) -> Self {
        let rows = groups
            .into_iter()
            .map(|((country, vat_rate), (total_value, total_vat))| CountryAggregate {
                country,
                vat_rate,
                total_value,
                total_vat,
            })
            .collect();
        Self {
            rows,
            kind: PhantomData,
        }
    }

    pub fn rows(&self) -> &[CountryAggregate] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_value(&self) -> Decimal {
        self.rows.iter().map(|r| r.total_value).sum()
    }

    pub fn total_vat(&self) -> Decimal {
        self.rows.iter().map(|r| r.total_vat).sum()
    }

    /// Rows for one country (one per distinct rate).
    pub fn for_country<'s>(&'s self, country: &'s str) -> impl Iterator<Item = &'s CountryAggregate> {
        self.rows.iter().filter(move |r| r.country == country)
    }

    /// Σ VAT for one country, zero if absent.
    pub fn vat_for(&self, country: &str) -> Decimal {
        self.for_country(country).map(|r| r.total_vat).sum()
    }
}

/// Duty refundable on returns for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DutyAggregate {
    pub country: String,
    pub total_returned_value: Decimal,
    pub total_duty: Decimal,
}

/// Duty refunds per country plus the goods codes that had no rate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DutyRefundTable {
    rows: Vec<DutyAggregate>,
    warnings: Vec<DataQualityWarning>,
}

impl DutyRefundTable {
    pub fn rows(&self) -> &[DutyAggregate] {
        &self.rows
    }

    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_duty(&self) -> Decimal {
        self.rows.iter().map(|r| r.total_duty).sum()
    }

    pub fn total_returned_value(&self) -> Decimal {
        self.rows.iter().map(|r| r.total_returned_value).sum()
    }

    pub fn duty_for(&self, country: &str) -> Decimal {
        self.rows
            .iter()
            .filter(|r| r.country == country)
            .map(|r| r.total_duty)
            .sum()
    }
}

/// Computes per-country totals over a set of consignments.
///
/// Pure: the same consignments always produce the same tables, and row
/// order does not depend on input order.
#[derive(Debug, Clone)]
pub struct RegimeAggregator<'a> {
    rates: &'a RateTable,
    filter: CountryFilter,
    rate_source: VatRateSource,
}

impl<'a> RegimeAggregator<'a> {
    /// All destinations, destination VAT rates.
    pub fn new(rates: &'a RateTable) -> Self {
        Self {
            rates,
            filter: CountryFilter::All,
            rate_source: VatRateSource::PerCountry,
        }
    }

    pub fn with_filter(mut self, filter: CountryFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_rate_source(mut self, source: VatRateSource) -> Self {
        self.rate_source = source;
        self
    }

    /// Import VAT owed: `consignment value × rate`, one term per consignment.
    pub fn vat_due(&self, consignments: &[Consignment]) -> VatDueTable {
        let mut groups: BTreeMap<(String, Decimal), (Decimal, Decimal)> = BTreeMap::new();
        for c in consignments.iter().filter(|c| self.filter.admits(&c.country)) {
            let Some(rate) = self.rate_source.resolve(c) else {
                continue;
            };
            let entry = groups.entry((c.country.clone(), rate)).or_default();
            entry.0 += c.value;
            entry.1 += c.value * rate;
        }
        let table = VatDueTable::from_groups(groups);
        debug!("VAT due: {} country rows", table.len());
        table
    }

    /// VAT refundable on returns: `returned value × rate`, one term per
    /// returned line.
    pub fn vat_refund(&self, consignments: &[Consignment]) -> VatRefundTable {
        let mut groups: BTreeMap<(String, Decimal), (Decimal, Decimal)> = BTreeMap::new();
        for c in consignments.iter().filter(|c| self.filter.admits(&c.country)) {
            let Some(rate) = self.rate_source.resolve(c) else {
                continue;
            };
            for line in c.returned_lines() {
                let returned = line.returned_value();
                let entry = groups.entry((c.country.clone(), rate)).or_default();
                entry.0 += returned;
                entry.1 += returned * rate;
            }
        }
        let table = VatRefundTable::from_groups(groups);
        debug!("VAT refund: {} country rows", table.len());
        table
    }

    /// Customs duty refundable on returns.
    ///
    /// Duty-excluded countries never contribute. Lines whose goods code has
    /// no duty rate count towards returned value but add zero duty, and are
    /// reported as warnings.
    pub fn duty_refund(
        &self,
        consignments: &[Consignment],
        duty_rates: &DutyRateTable,
    ) -> DutyRefundTable {
        let mut groups: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
        let mut unmapped: BTreeMap<String, usize> = BTreeMap::new();

        for c in consignments.iter().filter(|c| {
            self.filter.admits(&c.country) && !self.rates.is_duty_excluded(&c.country)
        }) {
            for line in c.returned_lines() {
                let returned = line.returned_value();
                let entry = groups.entry(c.country.clone()).or_default();
                entry.0 += returned;
                match duty_rates.rate_for(&line.goods_code) {
                    Some(rate) => entry.1 += returned * rate,
                    None => *unmapped.entry(goods_code_prefix(&line.goods_code)).or_default() += 1,
                }
            }
        }

        let rows: Vec<DutyAggregate> = groups
            .into_iter()
            .map(|(country, (total_returned_value, total_duty))| DutyAggregate {
                country,
                total_returned_value,
                total_duty,
            })
            .collect();
        let warnings: Vec<DataQualityWarning> = unmapped
            .into_iter()
            .map(|(prefix, lines)| DataQualityWarning::UnmappedGoodsCode { prefix, lines })
            .collect();
        for w in &warnings {
            warn!("{w}");
        }
        debug!("Duty refund: {} country rows", rows.len());

        DutyRefundTable { rows, warnings }
    }
}
