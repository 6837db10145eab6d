//! Record source: consignment line CSV and duty-rate CSV.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use ::csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use tracing::{debug, info};

use crate::core::{
    ClientProfile, DutyRateTable, LineItem, LineItemBuilder, ReclaimError, is_missing_reference,
    normalize_country,
};

/// One row of the carrier's consignment export. Numbers stay text until
/// they are validated so errors can name the row.
#[derive(Debug, Deserialize)]
struct RawLine {
    #[serde(rename = "MRN", default)]
    mrn: Option<String>,
    #[serde(rename = "Parcel ID")]
    parcel_id: String,
    #[serde(rename = "HS CODE", default)]
    goods_code: Option<String>,
    #[serde(rename = "Line Item Quantity Imported")]
    quantity_imported: String,
    #[serde(rename = "Line Item Quantity Returned", default)]
    quantity_returned: Option<String>,
    #[serde(rename = "Line Item Unit Price")]
    unit_price: String,
    #[serde(rename = "Consignee Country")]
    country: String,
}

#[derive(Debug, Deserialize)]
struct RawDutyRate {
    goods_code: String,
    #[serde(default)]
    rate: Option<String>,
}

/// What the record source kept and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub rows_read: usize,
    pub line_items: usize,
    /// Rows dropped per excluded destination.
    pub excluded: BTreeMap<String, usize>,
}

impl IngestSummary {
    pub fn rows_excluded(&self) -> usize {
        self.excluded.values().sum()
    }
}

/// Read consignment lines from CSV, dropping destinations the profile
/// excludes.
///
/// Missing-reference sentinels (`#N/A`, `N/A`, `NA`, `na`, blank) become
/// `None`; a missing returned quantity is zero.
pub fn read_line_items<R: Read>(
    reader: R,
    profile: &ClientProfile,
) -> Result<(Vec<LineItem>, IngestSummary), ReclaimError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut lines = Vec::new();
    let mut summary = IngestSummary::default();

    for (i, record) in rdr.deserialize::<RawLine>().enumerate() {
        let row = i + 1;
        let raw = record.map_err(|e| ReclaimError::Ingest(format!("row {row}: {e}")))?;
        summary.rows_read += 1;

        let country = normalize_country(&raw.country);
        if profile.is_ingest_excluded(&country) {
            debug!("Row {row}: dropping excluded destination {country}");
            *summary.excluded.entry(country).or_default() += 1;
            continue;
        }
        lines.push(to_line_item(raw, &country, row)?);
    }

    summary.line_items = lines.len();
    info!(
        "Read {} line items ({} rows, {} excluded)",
        summary.line_items,
        summary.rows_read,
        summary.rows_excluded()
    );
    Ok((lines, summary))
}

pub fn read_line_items_from_path(
    path: impl AsRef<Path>,
    profile: &ClientProfile,
) -> Result<(Vec<LineItem>, IngestSummary), ReclaimError> {
    let file = std::fs::File::open(path)?;
    read_line_items(file, profile)
}

fn to_line_item(raw: RawLine, country: &str, row: usize) -> Result<LineItem, ReclaimError> {
    let quantity_imported = parse_quantity(&raw.quantity_imported, "quantity imported", row)?;
    let quantity_returned = match raw.quantity_returned.as_deref() {
        Some(q) if !q.is_empty() => parse_quantity(q, "quantity returned", row)?,
        _ => 0,
    };
    let unit_price = parse_decimal(&raw.unit_price, "unit price", row)?;

    let mut builder = LineItemBuilder::new(raw.parcel_id, country, quantity_imported, unit_price)
        .returned(quantity_returned);
    if let Some(mrn) = raw.mrn.filter(|m| !is_missing_reference(m)) {
        builder = builder.consignment_ref(mrn);
    }
    if let Some(code) = raw.goods_code {
        builder = builder.goods_code(code);
    }
    builder
        .try_build()
        .map_err(|e| ReclaimError::Ingest(format!("row {row}: {e}")))
}

fn parse_decimal(value: &str, field: &str, row: usize) -> Result<Decimal, ReclaimError> {
    Decimal::from_str(value.trim())
        .map_err(|_| ReclaimError::Ingest(format!("row {row}: invalid {field} '{value}'")))
}

/// Spreadsheet exports write counts as `5.0`; accept whole numbers only.
fn parse_quantity(value: &str, field: &str, row: usize) -> Result<u32, ReclaimError> {
    let d = parse_decimal(value, field, row)?;
    if d.fract() != Decimal::ZERO || d < Decimal::ZERO {
        return Err(ReclaimError::Ingest(format!(
            "row {row}: {field} must be a whole number, got '{value}'"
        )));
    }
    d.to_u32()
        .ok_or_else(|| ReclaimError::Ingest(format!("row {row}: {field} '{value}' out of range")))
}

/// Read a `goods_code,rate` CSV. Empty rates mean unknown and are left out
/// of the table; duplicates on the same 4-character prefix keep the highest
/// rate.
pub fn read_duty_rates<R: Read>(reader: R) -> Result<DutyRateTable, ReclaimError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut entries = Vec::new();
    for (i, record) in rdr.deserialize::<RawDutyRate>().enumerate() {
        let row = i + 1;
        let raw = record.map_err(|e| ReclaimError::Ingest(format!("duty rates row {row}: {e}")))?;
        let rate = match raw.rate.as_deref() {
            Some(r) if !r.is_empty() => Some(parse_decimal(r, "duty rate", row)?),
            _ => None,
        };
        entries.push((raw.goods_code, rate));
    }
    let table = DutyRateTable::from_entries(entries)?;
    info!("Loaded {} duty rates", table.len());
    Ok(table)
}

pub fn read_duty_rates_from_path(path: impl AsRef<Path>) -> Result<DutyRateTable, ReclaimError> {
    let file = std::fs::File::open(path)?;
    read_duty_rates(file)
}
