//! Edge cases: empty periods, missing references, unmapped keys, bad configuration.

#![cfg(feature = "engine")]

use dutyrefund::core::*;
use dutyrefund::engine::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn duty_rates() -> DutyRateTable {
    DutyRateTable::from_entries([("6204", Some(dec!(0.12)))]).unwrap()
}

// ---------------------------------------------------------------------------
// Empty and return-free periods
// ---------------------------------------------------------------------------

#[test]
fn empty_input_produces_empty_tables() {
    let out = run(&ClientProfile::default(), &[], &duty_rates()).unwrap();
    assert!(out.classification.low_value.is_empty());
    assert!(out.classification.high_value.is_empty());
    assert!(out.low_value.vat_due.is_empty());
    assert!(out.high_value.refunds.is_empty());
    assert!(out.high_value.revenue.is_empty());
    assert_eq!(out.settlement, SettlementReport::default());
    assert!(!out.has_warnings());
}

#[test]
fn period_without_returns_settles_on_vat_alone() {
    let lines = vec![
        LineItemBuilder::new("P1", "DE", 1, dec!(100)).build(),
        LineItemBuilder::new("P2", "AT", 1, dec!(500)).build(),
    ];
    let out = run(&ClientProfile::direct(), &lines, &duty_rates()).unwrap();
    assert!(out.low_value.vat_refund.is_empty());
    assert!(out.high_value.refunds.is_empty());
    let s = &out.settlement;
    assert_eq!(s.total_commission, Decimal::ZERO);
    assert_eq!(s.payback_amount, Decimal::ZERO);
    assert_eq!(s.invoice_amount, dec!(19) + dec!(100));
}

// ---------------------------------------------------------------------------
// Consignment keys
// ---------------------------------------------------------------------------

#[test]
fn sentinel_references_fall_back_to_parcel_id() {
    let lines = vec![
        LineItemBuilder::new("P1", "DE", 1, dec!(100))
            .consignment_ref("#N/A")
            .build(),
        LineItemBuilder::new("P2", "DE", 1, dec!(100))
            .consignment_ref("  ")
            .build(),
        LineItemBuilder::new("P3", "DE", 1, dec!(100))
            .consignment_ref("N/A")
            .build(),
    ];
    let out = run(&ClientProfile::default(), &lines, &duty_rates()).unwrap();
    let refs: Vec<&str> = out
        .classification
        .low_value
        .iter()
        .map(|c| c.reference.as_str())
        .collect();
    assert_eq!(refs, ["P1", "P2", "P3"]);
    assert!(out.classification.high_value.is_empty());
}

#[test]
fn shared_reference_sums_every_line() {
    let lines = vec![
        LineItemBuilder::new("P1", "DE", 1, dec!(100))
            .consignment_ref("M1")
            .build(),
        LineItemBuilder::new("P2", "DE", 1, dec!(100))
            .consignment_ref("M1")
            .build(),
    ];
    let out = run(&ClientProfile::direct(), &lines, &duty_rates()).unwrap();
    assert_eq!(out.classification.high_value.len(), 1);
    assert_eq!(out.classification.high_value[0].value, dec!(200));
}

#[test]
fn country_codes_are_normalized() {
    let lines = vec![LineItemBuilder::new("P1", " de", 1, dec!(100)).build()];
    let out = run(&ClientProfile::default(), &lines, &duty_rates()).unwrap();
    assert_eq!(out.low_value.vat_due.vat_for("DE"), dec!(19));
    assert!(!out.has_warnings());
}

// ---------------------------------------------------------------------------
// Data-quality warnings
// ---------------------------------------------------------------------------

#[test]
fn unmapped_country_is_a_warning_not_a_zero_rate() {
    let lines = vec![
        LineItemBuilder::new("P1", "XK", 2, dec!(50)).build(),
        LineItemBuilder::new("P2", "XK", 1, dec!(10)).build(),
        LineItemBuilder::new("P3", "DE", 1, dec!(10)).build(),
    ];
    let out = run(&ClientProfile::default(), &lines, &duty_rates()).unwrap();
    assert_eq!(
        out.warnings,
        [DataQualityWarning::UnmappedCountry {
            country: "XK".into(),
            consignments: 2,
        }]
    );
    // Classified, but left out of the VAT sums.
    assert_eq!(out.classification.low_value.len(), 3);
    assert_eq!(out.low_value.vat_due.len(), 1);
    assert_eq!(out.low_value.vat_due.total_value(), dec!(10));
}

#[test]
fn unmapped_goods_code_counts_value_but_no_duty() {
    let lines = vec![
        LineItemBuilder::new("P1", "DE", 2, dec!(200))
            .goods_code("9503000000")
            .returned(2)
            .build(),
        LineItemBuilder::new("P2", "DE", 1, dec!(200))
            .goods_code("9503000000")
            .returned(1)
            .build(),
    ];
    let out = run(&ClientProfile::direct(), &lines, &duty_rates()).unwrap();
    let duty = &out.high_value.duty;
    assert_eq!(duty.total_returned_value(), dec!(600));
    assert_eq!(duty.total_duty(), Decimal::ZERO);
    assert_eq!(
        duty.warnings(),
        [DataQualityWarning::UnmappedGoodsCode {
            prefix: "9503".into(),
            lines: 2,
        }]
    );
    assert!(out.warnings[0].to_string().contains("9503"));
}

#[test]
fn ireland_gets_no_duty_even_with_a_known_rate() {
    let lines = vec![
        LineItemBuilder::new("P1", "IE", 1, dec!(400))
            .goods_code("6204629090")
            .returned(1)
            .build(),
    ];
    let out = run(&ClientProfile::direct(), &lines, &duty_rates()).unwrap();
    assert!(out.high_value.duty.is_empty());
    let ie = out.high_value.refunds.get("IE").unwrap();
    assert_eq!(ie.duty_refund, Decimal::ZERO);
    assert_eq!(ie.vat_refund, dec!(92));
    // Commission still applies at the Irish rate.
    assert_eq!(out.high_value.revenue.get("IE").unwrap().revenue, dec!(27.6));
}

#[test]
fn duty_only_country_still_merged() {
    // VAT rate unknown, duty rate known: duty refund with no VAT side.
    let rates = RateTable::builder()
        .vat_rate("DE", dec!(0.19))
        .build()
        .unwrap();
    let profile = ClientProfile::direct().with_rates(rates);
    let lines = vec![
        LineItemBuilder::new("P1", "FR", 1, dec!(500))
            .goods_code("6204")
            .returned(1)
            .build(),
    ];
    let out = run(&profile, &lines, &duty_rates()).unwrap();
    let fr = out.high_value.refunds.get("FR").unwrap();
    assert_eq!(fr.vat_rate, None);
    assert_eq!(fr.vat_refund, Decimal::ZERO);
    assert_eq!(fr.duty_refund, dec!(60));
    assert_eq!(fr.total_returned_value, dec!(500));
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn threshold_must_be_positive() {
    assert!(Threshold::new(Decimal::ZERO).is_err());
    assert!(Threshold::new(dec!(-1)).is_err());
    assert!(Threshold::new(dec!(0.01)).is_ok());
}

#[test]
fn domestic_country_needs_a_vat_rate() {
    let profile = ClientProfile::default()
        .with_domestic(Some(DomesticJurisdiction::new("LU", dec!(0.17))));
    assert!(matches!(Pipeline::new(&profile), Err(ReclaimError::Config(_))));
}

#[test]
fn over_return_rejected_at_build() {
    let err = LineItemBuilder::new("P1", "DE", 1, dec!(10))
        .returned(2)
        .try_build()
        .unwrap_err();
    assert!(matches!(err, ReclaimError::Config(_)));
}

#[test]
fn duty_rate_outside_unit_interval_rejected() {
    assert!(DutyRateTable::from_entries([("6204", Some(dec!(1.01)))]).is_err());
    assert!(DutyRateTable::from_entries([("6204", Some(dec!(-0.1)))]).is_err());
}

#[test]
fn domestic_broker_pays_on_unmapped_destinations_too() {
    let lines = vec![LineItemBuilder::new("P1", "XK", 1, dec!(1000)).build()];
    let out = run(&ClientProfile::netherlands_broker(), &lines, &duty_rates()).unwrap();
    assert_eq!(out.high_value.broker.paid, dec!(210));
    assert_eq!(out.high_value.broker.reclaimable, dec!(210));
    assert!(out.high_value.oss_due.is_empty());
}
