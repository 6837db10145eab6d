use thiserror::Error;

/// Errors that abort a settlement computation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReclaimError {
    /// Invalid configuration or input rejected at entry.
    #[error("configuration error: {0}")]
    Config(String),

    /// An internal consistency rule was broken; continuing would corrupt a figure.
    #[error("structural violation: {0}")]
    Structural(String),

    /// The record source could not be read or a row could not be parsed.
    #[error("ingest error: {0}")]
    Ingest(String),

    /// The report sink failed to write a table.
    #[error("report error: {0}")]
    Report(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A non-fatal data-quality problem found while processing.
///
/// Warnings never abort a run. The affected rows contribute zero to the
/// sums they would have fed, and the keys are surfaced so that source data
/// can be corrected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// Destination country has no VAT rate in the rate table.
    UnmappedCountry {
        /// ISO 3166-1 alpha-2 code as it appeared in the data.
        country: String,
        /// Number of consignments routed to it.
        consignments: usize,
    },
    /// Returned line whose goods code prefix has no duty rate.
    UnmappedGoodsCode {
        /// First four characters of the goods code.
        prefix: String,
        /// Number of returned lines carrying it.
        lines: usize,
    },
}

impl DataQualityWarning {
    /// The offending key (country code or goods code prefix).
    pub fn key(&self) -> &str {
        match self {
            Self::UnmappedCountry { country, .. } => country,
            Self::UnmappedGoodsCode { prefix, .. } => prefix,
        }
    }

    /// Number of consignments or lines affected.
    pub fn occurrences(&self) -> usize {
        match self {
            Self::UnmappedCountry { consignments, .. } => *consignments,
            Self::UnmappedGoodsCode { lines, .. } => *lines,
        }
    }
}

impl std::fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnmappedCountry {
                country,
                consignments,
            } => write!(
                f,
                "no VAT rate for country '{country}' ({consignments} consignment(s) excluded from VAT sums)"
            ),
            Self::UnmappedGoodsCode { prefix, lines } => write!(
                f,
                "no duty rate for goods code prefix '{prefix}' ({lines} returned line(s) contribute zero duty)"
            ),
        }
    }
}
