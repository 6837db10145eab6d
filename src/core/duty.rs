//! Customs duty rates keyed by 4-character goods code prefix.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReclaimError;
use super::types::goods_code_prefix;

/// Mapping from goods code prefix to duty rate in `[0, 1]`.
///
/// A prefix missing from the table means "rate unknown", which is
/// distinct from a zero rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DutyRateTable {
    rates: BTreeMap<String, Decimal>,
}

impl DutyRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from tariff entries of `(goods code, parsed rate)`.
    ///
    /// Entries are keyed by the first four characters of the goods code.
    /// When several entries share a prefix the highest rate wins. Entries
    /// without a numeric rate are dropped.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, ReclaimError>
    where
        I: IntoIterator<Item = (S, Option<Decimal>)>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (code, rate) in entries {
            let Some(rate) = rate else { continue };
            table.insert_max(code.as_ref(), rate)?;
        }
        Ok(table)
    }

    /// Insert a rate, keeping the existing one if it is higher.
    pub fn insert_max(&mut self, goods_code: &str, rate: Decimal) -> Result<(), ReclaimError> {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(ReclaimError::Config(format!(
                "duty rate for goods code '{goods_code}' must be within [0, 1], got {rate}"
            )));
        }
        let prefix = goods_code_prefix(goods_code);
        if prefix.is_empty() {
            return Err(ReclaimError::Config("duty rate entry without goods code".into()));
        }
        self.rates
            .entry(prefix)
            .and_modify(|existing| *existing = (*existing).max(rate))
            .or_insert(rate);
        Ok(())
    }

    /// Duty rate for any goods code, looked up by its prefix.
    pub fn rate_for(&self, goods_code: &str) -> Option<Decimal> {
        self.rates.get(&goods_code_prefix(goods_code)).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// `(prefix, rate)` pairs sorted by prefix.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.rates.iter().map(|(p, r)| (p.as_str(), *r))
    }
}
