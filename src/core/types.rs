use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Placeholder values carriers put in the movement reference column when
/// no customs declaration exists for a parcel.
const MISSING_REFERENCE_MARKERS: &[&str] = &["#N/A", "N/A", "NA", "na"];

/// One imported product line within a parcel.
///
/// Read-only once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Customs movement reference (MRN). `None` when the parcel was not
    /// declared under its own movement reference.
    pub consignment_ref: Option<String>,
    /// Carrier parcel identifier, unique per parcel.
    pub parcel_id: String,
    /// Goods classification (HS/CN) code.
    pub goods_code: String,
    /// Units imported.
    pub quantity_imported: u32,
    /// Units returned by the customer (≤ `quantity_imported`).
    pub quantity_returned: u32,
    /// Price per unit, excluding VAT.
    pub unit_price: Decimal,
    /// Destination (consignee) country, ISO 3166-1 alpha-2.
    pub country: String,
}

impl LineItem {
    /// Key under which this line is grouped into a consignment.
    ///
    /// The movement reference when present; otherwise the parcel id, so
    /// undeclared parcels become singleton consignments instead of
    /// collapsing together under a blank key.
    pub fn consignment_key(&self) -> &str {
        match self.consignment_ref.as_deref().map(str::trim) {
            Some(reference) if !is_missing_reference(reference) => reference,
            _ => &self.parcel_id,
        }
    }

    /// `quantity_imported × unit_price`.
    pub fn total_value(&self) -> Decimal {
        Decimal::from(self.quantity_imported) * self.unit_price
    }

    /// `quantity_returned × unit_price`.
    pub fn returned_value(&self) -> Decimal {
        Decimal::from(self.quantity_returned) * self.unit_price
    }

    /// Whether any unit of this line came back.
    pub fn has_returns(&self) -> bool {
        self.quantity_returned > 0
    }

    /// First four characters of the goods code, the duty-rate lookup key.
    pub fn goods_code_prefix(&self) -> String {
        goods_code_prefix(&self.goods_code)
    }
}

/// Whether a raw movement reference value means "no reference".
pub fn is_missing_reference(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || MISSING_REFERENCE_MARKERS.contains(&value)
}

/// First four characters of a goods code (fewer if the code is shorter).
pub fn goods_code_prefix(code: &str) -> String {
    code.trim().chars().take(4).collect()
}

/// Customs-declared unit: all line items sharing a consignment key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consignment {
    /// Consignment key (movement reference or parcel id).
    pub reference: String,
    /// Destination country of the first-seen line.
    pub country: String,
    /// Σ `quantity_imported × unit_price` over every line.
    pub value: Decimal,
    /// Destination VAT rate; `None` when the country has no rate.
    pub vat_rate: Option<Decimal>,
    /// Every line item of the consignment, in input order.
    pub lines: Vec<LineItem>,
}

impl Consignment {
    /// `value × vat_rate`, zero when the rate is unknown.
    pub fn vat_amount(&self) -> Decimal {
        self.vat_rate.map_or(Decimal::ZERO, |rate| self.value * rate)
    }

    /// Lines with at least one returned unit.
    pub fn returned_lines(&self) -> impl Iterator<Item = &LineItem> {
        self.lines.iter().filter(|l| l.has_returns())
    }

    /// Σ returned value across the consignment's lines.
    pub fn returned_value(&self) -> Decimal {
        self.returned_lines().map(LineItem::returned_value).sum()
    }
}
