//! Per-client run configuration.
//!
//! Clients differ in threshold, commission table, excluded destinations and
//! whether a domestic broker declares high-value parcels. All of that is
//! data in a [`ClientProfile`]; the engine itself has a single code path.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::countries::{is_eu_member, normalize_country};
use super::error::ReclaimError;
use super::rates::RateTable;

/// Consignment value separating the IOSS and OSS regimes (EUR).
pub const DEFAULT_THRESHOLD: Decimal = dec!(150);

/// Low-value/high-value boundary. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Threshold(Decimal);

impl Threshold {
    pub fn new(value: Decimal) -> Result<Self, ReclaimError> {
        if value <= Decimal::ZERO {
            return Err(ReclaimError::Config(format!(
                "classification threshold must be positive, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Strictly above the threshold means high value.
    pub fn is_high_value(&self, consignment_value: Decimal) -> bool {
        consignment_value > self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl TryFrom<Decimal> for Threshold {
    type Error = ReclaimError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for Decimal {
    fn from(t: Threshold) -> Self {
        t.0
    }
}

/// The member state where a customs broker completes import formalities
/// for high-value parcels, paying import VAT at that state's rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomesticJurisdiction {
    /// ISO 3166-1 alpha-2 code of the declaring state.
    pub country: String,
    /// Import VAT rate the broker pays there.
    pub vat_rate: Decimal,
}

impl DomesticJurisdiction {
    pub fn new(country: &str, vat_rate: Decimal) -> Self {
        Self {
            country: normalize_country(country),
            vat_rate,
        }
    }

    /// Netherlands at 21%.
    pub fn netherlands() -> Self {
        Self::new("NL", dec!(0.21))
    }
}

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientProfile {
    /// Human-readable profile name, used in logs and report headers.
    pub name: String,
    /// IOSS/OSS boundary.
    pub threshold: Threshold,
    /// Country policy.
    pub rates: RateTable,
    /// Declaring jurisdiction for high-value parcels, if any.
    pub domestic: Option<DomesticJurisdiction>,
    /// Destinations dropped by the record source (non-EU territories).
    pub ingest_excluded_countries: BTreeSet<String>,
}

impl Default for ClientProfile {
    fn default() -> Self {
        Self::netherlands_broker()
    }
}

impl ClientProfile {
    /// High-value parcels cleared by a Dutch broker; low-value via IOSS.
    pub fn netherlands_broker() -> Self {
        Self {
            name: "netherlands-broker".into(),
            threshold: Threshold::default(),
            rates: RateTable::default(),
            domestic: Some(DomesticJurisdiction::netherlands()),
            ingest_excluded_countries: BTreeSet::from(["CH".to_string(), "IC".to_string()]),
        }
    }

    /// No declaring jurisdiction: every high-value consignment goes
    /// through OSS and no broker VAT is involved.
    pub fn direct() -> Self {
        Self {
            name: "direct".into(),
            domestic: None,
            ..Self::netherlands_broker()
        }
    }

    /// Look up a preset by name (`netherlands`, `netherlands-broker`, `direct`).
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "netherlands" | "netherlands-broker" | "nl" => Some(Self::netherlands_broker()),
            "direct" => Some(Self::direct()),
            _ => None,
        }
    }

    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_rates(mut self, rates: RateTable) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_domestic(mut self, domestic: Option<DomesticJurisdiction>) -> Self {
        self.domestic = domestic;
        self
    }

    /// Domestic country code, if a declaring jurisdiction is configured.
    pub fn domestic_country(&self) -> Option<&str> {
        self.domestic.as_ref().map(|d| d.country.as_str())
    }

    /// Whether the record source should drop rows for this destination.
    pub fn is_ingest_excluded(&self, country: &str) -> bool {
        self.ingest_excluded_countries
            .contains(&normalize_country(country))
    }

    /// Reject profiles that cannot produce a correct settlement.
    pub fn validate(&self) -> Result<(), ReclaimError> {
        // Deserialized thresholds are checked by `try_from`; this guards
        // values assembled by hand.
        Threshold::new(self.threshold.value())?;
        self.rates.validate()?;
        if let Some(domestic) = &self.domestic {
            if !is_eu_member(&domestic.country) {
                return Err(ReclaimError::Config(format!(
                    "declaring jurisdiction {} is not an EU member state",
                    domestic.country
                )));
            }
            if domestic.vat_rate < Decimal::ZERO || domestic.vat_rate > Decimal::ONE {
                return Err(ReclaimError::Config(format!(
                    "domestic VAT rate must be within [0, 1], got {}",
                    domestic.vat_rate
                )));
            }
            if self.rates.vat_rate(&domestic.country).is_none() {
                return Err(ReclaimError::Config(format!(
                    "domestic country {} has no VAT rate in the rate table",
                    domestic.country
                )));
            }
        }
        Ok(())
    }
}

#[cfg(feature = "json")]
impl ClientProfile {
    /// Parse and validate a profile from JSON. Missing fields take the
    /// `netherlands_broker` defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ReclaimError> {
        let profile: Self = serde_json::from_str(json)
            .map_err(|e| ReclaimError::Config(format!("invalid profile JSON: {e}")))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Read a profile from a JSON file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ReclaimError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ReclaimError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ReclaimError::Config(format!("cannot serialize profile: {e}")))
    }
}
