use rust_decimal::Decimal;

use super::countries::normalize_country;
use super::error::ReclaimError;
use super::types::LineItem;

/// Builder for [`LineItem`].
///
/// ```
/// use dutyrefund::core::*;
/// use rust_decimal_macros::dec;
///
/// let line = LineItemBuilder::new("PARCEL-1", "ie", 5, dec!(30))
///     .consignment_ref("24NL0000000000001")
///     .goods_code("6204629090")
///     .returned(2)
///     .build();
///
/// assert_eq!(line.country, "IE");
/// assert_eq!(line.returned_value(), dec!(60));
/// ```
pub struct LineItemBuilder {
    consignment_ref: Option<String>,
    parcel_id: String,
    goods_code: String,
    quantity_imported: u32,
    quantity_returned: u32,
    unit_price: Decimal,
    country: String,
}

impl LineItemBuilder {
    pub fn new(
        parcel_id: impl Into<String>,
        country: &str,
        quantity_imported: u32,
        unit_price: Decimal,
    ) -> Self {
        Self {
            consignment_ref: None,
            parcel_id: parcel_id.into(),
            goods_code: String::new(),
            quantity_imported,
            quantity_returned: 0,
            unit_price,
            country: normalize_country(country),
        }
    }

    /// Customs movement reference (MRN).
    pub fn consignment_ref(mut self, reference: impl Into<String>) -> Self {
        self.consignment_ref = Some(reference.into());
        self
    }

    pub fn goods_code(mut self, code: impl Into<String>) -> Self {
        self.goods_code = code.into();
        self
    }

    pub fn returned(mut self, quantity: u32) -> Self {
        self.quantity_returned = quantity;
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            consignment_ref: self.consignment_ref,
            parcel_id: self.parcel_id,
            goods_code: self.goods_code,
            quantity_imported: self.quantity_imported,
            quantity_returned: self.quantity_returned,
            unit_price: self.unit_price,
            country: self.country,
        }
    }

    /// Build, rejecting lines that would produce wrong sums.
    pub fn try_build(self) -> Result<LineItem, ReclaimError> {
        if self.parcel_id.trim().is_empty() {
            return Err(ReclaimError::Config("parcel id must not be empty".into()));
        }
        if self.country.is_empty() {
            return Err(ReclaimError::Config(format!(
                "parcel {} has no destination country",
                self.parcel_id
            )));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(ReclaimError::Config(format!(
                "parcel {} has negative unit price {}",
                self.parcel_id, self.unit_price
            )));
        }
        if self.quantity_returned > self.quantity_imported {
            return Err(ReclaimError::Config(format!(
                "parcel {} returns {} of {} imported units",
                self.parcel_id, self.quantity_returned, self.quantity_imported
            )));
        }
        Ok(self.build())
    }
}
