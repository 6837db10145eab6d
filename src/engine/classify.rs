//! Grouping line items into consignments and splitting them by regime.

use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::{
    Consignment, DataQualityWarning, LineItem, RateTable, ReclaimError, Threshold,
    normalize_country,
};

/// Consignments split into the two VAT regimes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Value ≤ threshold: declared under IOSS.
    pub low_value: Vec<Consignment>,
    /// Value > threshold: declared under OSS (or domestically).
    pub high_value: Vec<Consignment>,
    /// Destinations without a VAT rate.
    pub warnings: Vec<DataQualityWarning>,
}

impl Classification {
    /// Total number of consignments across both regimes.
    pub fn consignment_count(&self) -> usize {
        self.low_value.len() + self.high_value.len()
    }

    /// Fail if any consignment reference appears in both partitions.
    pub fn ensure_disjoint(&self) -> Result<(), ReclaimError> {
        let low: HashSet<&str> = self.low_value.iter().map(|c| c.reference.as_str()).collect();
        if let Some(c) = self
            .high_value
            .iter()
            .find(|c| low.contains(c.reference.as_str()))
        {
            return Err(ReclaimError::Structural(format!(
                "consignment {} classified as both low and high value",
                c.reference
            )));
        }
        Ok(())
    }
}

/// Deduplicates line items into consignments, values them, assigns the
/// destination VAT rate and partitions them around the threshold.
#[derive(Debug, Clone, Copy)]
pub struct ConsignmentClassifier<'a> {
    rates: &'a RateTable,
    threshold: Threshold,
}

impl<'a> ConsignmentClassifier<'a> {
    pub fn new(rates: &'a RateTable, threshold: Threshold) -> Self {
        Self { rates, threshold }
    }

    /// Group lines by consignment key, preserving first-seen order.
    ///
    /// The consignment's country is taken from its first line; its value is
    /// the sum over all of its lines.
    pub fn group(&self, lines: &[LineItem]) -> (Vec<Consignment>, Vec<DataQualityWarning>) {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(lines.len());
        let mut consignments: Vec<Consignment> = Vec::new();

        for line in lines {
            let key = line.consignment_key();
            match index.get(key) {
                Some(&i) => {
                    let c = &mut consignments[i];
                    c.value += line.total_value();
                    c.lines.push(line.clone());
                }
                None => {
                    let country = normalize_country(&line.country);
                    let vat_rate = self.rates.vat_rate(&country);
                    index.insert(key, consignments.len());
                    consignments.push(Consignment {
                        reference: key.to_string(),
                        country,
                        value: line.total_value(),
                        vat_rate,
                        lines: vec![line.clone()],
                    });
                }
            }
        }

        let mut unmapped: BTreeMap<&str, usize> = BTreeMap::new();
        for c in consignments.iter().filter(|c| c.vat_rate.is_none()) {
            *unmapped.entry(c.country.as_str()).or_default() += 1;
        }
        let warnings: Vec<DataQualityWarning> = unmapped
            .into_iter()
            .map(|(country, consignments)| DataQualityWarning::UnmappedCountry {
                country: country.to_string(),
                consignments,
            })
            .collect();
        for w in &warnings {
            warn!("{w}");
        }

        debug!(
            "Grouped {} line items into {} consignments",
            lines.len(),
            consignments.len()
        );
        (consignments, warnings)
    }

    /// Group and split into low-value (`value <= threshold`) and high-value
    /// (`value > threshold`) sets.
    pub fn classify(&self, lines: &[LineItem]) -> Result<Classification, ReclaimError> {
        let (consignments, warnings) = self.group(lines);
        let (high_value, low_value): (Vec<_>, Vec<_>) = consignments
            .into_iter()
            .partition(|c| self.threshold.is_high_value(c.value));

        let classification = Classification {
            low_value,
            high_value,
            warnings,
        };
        classification.ensure_disjoint()?;

        info!(
            "Classified {} consignments: {} low value (<= {}), {} high value",
            classification.consignment_count(),
            classification.low_value.len(),
            self.threshold.value(),
            classification.high_value.len()
        );
        Ok(classification)
    }
}

/// Sum of consignment values, handy as a conservation check.
pub fn total_value(consignments: &[Consignment]) -> Decimal {
    consignments.iter().map(|c| c.value).sum()
}
