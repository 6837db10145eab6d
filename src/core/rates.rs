//! Country policy: VAT rates, commission rates, duty-reclaim eligibility.
//!
//! One authoritative [`RateTable`] answers every country-conditional
//! question the engine asks. It is built once per run and never mutated.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::countries::normalize_country;
use super::error::ReclaimError;

/// Commission kept by the reclaim agent unless a country overrides it.
pub const DEFAULT_COMMISSION_RATE: Decimal = dec!(0.20);

/// Commission on refunds for Irish consignees.
pub const IE_COMMISSION_RATE: Decimal = dec!(0.30);

/// Standard VAT rates applied to imported consignments.
const DEFAULT_VAT_RATES: &[(&str, Decimal)] = &[
    ("AT", dec!(0.20)),
    ("BE", dec!(0.21)),
    ("DE", dec!(0.19)),
    ("DK", dec!(0.25)),
    ("EE", dec!(0.22)),
    ("ES", dec!(0.21)),
    ("FI", dec!(0.255)),
    ("IE", dec!(0.23)),
    ("IT", dec!(0.22)),
    ("NL", dec!(0.21)),
    ("PT", dec!(0.23)),
    ("SE", dec!(0.25)),
];

/// Country → VAT rate, country → commission rate, and the set of
/// countries where customs duty cannot be reclaimed on returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateTable {
    vat_rates: BTreeMap<String, Decimal>,
    default_commission_rate: Decimal,
    commission_overrides: BTreeMap<String, Decimal>,
    duty_excluded: BTreeSet<String>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            vat_rates: DEFAULT_VAT_RATES
                .iter()
                .map(|(c, r)| ((*c).to_string(), *r))
                .collect(),
            default_commission_rate: DEFAULT_COMMISSION_RATE,
            commission_overrides: BTreeMap::from([("IE".to_string(), IE_COMMISSION_RATE)]),
            duty_excluded: BTreeSet::from(["IE".to_string()]),
        }
    }
}

impl RateTable {
    /// Start an empty table (no VAT rates, 20% default commission).
    pub fn builder() -> RateTableBuilder {
        RateTableBuilder::new()
    }

    /// VAT rate for a destination. `None` means the country is unknown,
    /// which is a data-quality problem, never an implicit zero.
    pub fn vat_rate(&self, country: &str) -> Option<Decimal> {
        self.vat_rates.get(country).copied()
    }

    /// Reclaim agent's share of a refund for this country.
    pub fn commission_rate(&self, country: &str) -> Decimal {
        self.commission_overrides
            .get(country)
            .copied()
            .unwrap_or(self.default_commission_rate)
    }

    /// Counterparty's share of a refund for this country.
    pub fn counterparty_rate(&self, country: &str) -> Decimal {
        Decimal::ONE - self.commission_rate(country)
    }

    /// Whether customs duty on returns cannot be reclaimed for this country.
    pub fn is_duty_excluded(&self, country: &str) -> bool {
        self.duty_excluded.contains(country)
    }

    pub fn default_commission_rate(&self) -> Decimal {
        self.default_commission_rate
    }

    /// Countries with a known VAT rate, sorted.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.vat_rates.keys().map(String::as_str)
    }

    /// Duty-excluded countries, sorted.
    pub fn duty_excluded_countries(&self) -> impl Iterator<Item = &str> {
        self.duty_excluded.iter().map(String::as_str)
    }

    /// Check every rate lies in `[0, 1]` and every key is a 2-letter code.
    ///
    /// Tables deserialized from configuration bypass the builder, so
    /// profiles call this before a run.
    pub fn validate(&self) -> Result<(), ReclaimError> {
        for (country, rate) in &self.vat_rates {
            check_country(country)?;
            check_rate(&format!("VAT rate for {country}"), *rate)?;
        }
        check_rate("default commission rate", self.default_commission_rate)?;
        for (country, rate) in &self.commission_overrides {
            check_country(country)?;
            check_rate(&format!("commission rate for {country}"), *rate)?;
        }
        for country in &self.duty_excluded {
            check_country(country)?;
        }
        Ok(())
    }
}

fn check_rate(what: &str, rate: Decimal) -> Result<(), ReclaimError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ReclaimError::Config(format!(
            "{what} must be within [0, 1], got {rate}"
        )));
    }
    Ok(())
}

fn check_country(country: &str) -> Result<(), ReclaimError> {
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ReclaimError::Config(format!(
            "'{country}' is not an uppercase ISO 3166-1 alpha-2 code"
        )));
    }
    Ok(())
}

/// Builder for [`RateTable`].
///
/// ```
/// use dutyrefund::core::RateTable;
/// use rust_decimal_macros::dec;
///
/// let rates = RateTable::builder()
///     .vat_rate("DE", dec!(0.19))
///     .vat_rate("IE", dec!(0.23))
///     .commission("IE", dec!(0.30))
///     .duty_excluded("IE")
///     .build()
///     .unwrap();
///
/// assert_eq!(rates.commission_rate("DE"), dec!(0.20));
/// assert!(rates.is_duty_excluded("IE"));
/// ```
#[derive(Debug, Clone)]
pub struct RateTableBuilder {
    table: RateTable,
}

impl Default for RateTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateTableBuilder {
    pub fn new() -> Self {
        Self {
            table: RateTable {
                vat_rates: BTreeMap::new(),
                default_commission_rate: DEFAULT_COMMISSION_RATE,
                commission_overrides: BTreeMap::new(),
                duty_excluded: BTreeSet::new(),
            },
        }
    }

    pub fn vat_rate(mut self, country: &str, rate: Decimal) -> Self {
        self.table
            .vat_rates
            .insert(normalize_country(country), rate);
        self
    }

    pub fn default_commission(mut self, rate: Decimal) -> Self {
        self.table.default_commission_rate = rate;
        self
    }

    pub fn commission(mut self, country: &str, rate: Decimal) -> Self {
        self.table
            .commission_overrides
            .insert(normalize_country(country), rate);
        self
    }

    pub fn duty_excluded(mut self, country: &str) -> Self {
        self.table.duty_excluded.insert(normalize_country(country));
        self
    }

    /// Build and validate the table.
    pub fn build(self) -> Result<RateTable, ReclaimError> {
        self.table.validate()?;
        Ok(self.table)
    }
}
