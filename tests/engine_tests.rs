#![cfg(feature = "engine")]

use dutyrefund::core::*;
use dutyrefund::engine::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn duty_rates() -> DutyRateTable {
    DutyRateTable::from_entries([
        ("6204629090", Some(dec!(0.12))),
        ("6109100010", Some(dec!(0.08))),
    ])
    .unwrap()
}

/// Two low-value consignments (DE, AT) and three high-value ones
/// (IE, NL, DE), with returns on all but the first.
fn quarter() -> Vec<LineItem> {
    vec![
        LineItemBuilder::new("P1", "DE", 1, dec!(100))
            .consignment_ref("M1")
            .build(),
        LineItemBuilder::new("P2", "AT", 2, dec!(40))
            .consignment_ref("M2")
            .returned(1)
            .build(),
        LineItemBuilder::new("P3", "IE", 5, dec!(30))
            .consignment_ref("M3")
            .goods_code("6204629090")
            .returned(2)
            .build(),
        LineItemBuilder::new("P4", "IE", 1, dec!(150))
            .consignment_ref("M3")
            .build(),
        LineItemBuilder::new("P5", "NL", 1, dec!(200))
            .consignment_ref("M4")
            .goods_code("6204110000")
            .returned(1)
            .build(),
        LineItemBuilder::new("P6", "DE", 2, dec!(125))
            .consignment_ref("M5")
            .goods_code("6109100010")
            .returned(1)
            .build(),
    ]
}

// --- Worked example ---

#[test]
fn low_value_de_consignment() {
    let lines = vec![
        LineItemBuilder::new("P1", "DE", 1, dec!(100))
            .consignment_ref("MRN1")
            .build(),
    ];
    let out = run(&ClientProfile::default(), &lines, &DutyRateTable::new()).unwrap();
    assert_eq!(out.classification.low_value.len(), 1);
    assert!(out.classification.high_value.is_empty());

    let row = &out.low_value.vat_due.rows()[0];
    assert_eq!(row.country, "DE");
    assert_eq!(row.vat_rate, dec!(0.19));
    assert_eq!(row.total_value, dec!(100));
    assert_eq!(row.total_vat, dec!(19.00));
}

#[test]
fn high_value_ie_consignment_with_returns() {
    let lines = vec![
        LineItemBuilder::new("P1", "IE", 5, dec!(30))
            .consignment_ref("MRN2")
            .goods_code("6204629090")
            .returned(2)
            .build(),
        LineItemBuilder::new("P2", "IE", 1, dec!(150))
            .consignment_ref("MRN2")
            .build(),
    ];
    let out = run(&ClientProfile::default(), &lines, &duty_rates()).unwrap();

    let c = &out.classification.high_value[0];
    assert_eq!(c.value, dec!(300));
    assert_eq!(c.returned_value(), dec!(60));

    let refund = out.high_value.refunds.get("IE").unwrap();
    assert_eq!(refund.vat_refund, dec!(13.80));
    assert_eq!(refund.duty_refund, Decimal::ZERO);
    assert_eq!(refund.total_refund, dec!(13.80));

    let revenue = out.high_value.revenue.get("IE").unwrap();
    assert_eq!(revenue.commission_rate, dec!(0.30));
    assert_eq!(revenue.revenue, dec!(4.14));
    assert_eq!(revenue.counterparty_share, dec!(9.66));
}

// --- Classification ---

#[test]
fn threshold_is_inclusive_for_low_value() {
    let lines = vec![
        LineItemBuilder::new("P1", "DE", 1, dec!(150))
            .consignment_ref("AT_150")
            .build(),
        LineItemBuilder::new("P2", "DE", 1, dec!(150.01))
            .consignment_ref("ABOVE")
            .build(),
    ];
    let out = run(&ClientProfile::direct(), &lines, &DutyRateTable::new()).unwrap();
    assert_eq!(out.classification.low_value[0].reference, "AT_150");
    assert_eq!(out.classification.high_value[0].reference, "ABOVE");
}

#[test]
fn lines_without_reference_are_their_own_consignment() {
    let lines = vec![
        LineItemBuilder::new("P1", "DE", 1, dec!(100)).build(),
        LineItemBuilder::new("P2", "DE", 1, dec!(100)).build(),
    ];
    let out = run(&ClientProfile::default(), &lines, &DutyRateTable::new()).unwrap();
    // 200 together would be high value; apart both stay low.
    assert_eq!(out.classification.low_value.len(), 2);
    assert_eq!(out.low_value.vat_due.vat_for("DE"), dec!(38));
}

// --- Full quarter ---

#[test]
fn quarter_regime_tables() {
    let out = run(&ClientProfile::netherlands_broker(), &quarter(), &duty_rates()).unwrap();

    assert_eq!(out.low_value.vat_due.total_vat(), dec!(35));
    assert_eq!(out.low_value.vat_refund.vat_for("AT"), dec!(8));

    assert_eq!(out.high_value.oss_due.vat_for("IE"), dec!(69));
    assert_eq!(out.high_value.oss_due.vat_for("DE"), dec!(47.5));
    assert_eq!(out.high_value.oss_due.vat_for("NL"), Decimal::ZERO);
    assert_eq!(out.high_value.domestic_due.vat_for("NL"), dec!(42));
    assert_eq!(out.high_value.domestic_refund.vat_for("NL"), dec!(42));

    assert_eq!(out.high_value.duty.duty_for("DE"), dec!(10));
    assert_eq!(out.high_value.duty.duty_for("NL"), dec!(24));
    assert_eq!(out.high_value.duty.duty_for("IE"), Decimal::ZERO);
    assert!(!out.has_warnings());
}

#[test]
fn quarter_settlement() {
    let out = run(&ClientProfile::netherlands_broker(), &quarter(), &duty_rates()).unwrap();
    let s = &out.settlement;
    assert_eq!(s.net_ioss, dec!(27));
    assert_eq!(s.net_oss, dec!(78.95));
    assert_eq!(s.broker_paid_vat, dec!(157.50));
    assert_eq!(s.broker_reclaimable_vat, dec!(115.50));
    assert_eq!(s.domestic_vat_return, dec!(42));
    assert_eq!(s.total_duty_refund, dec!(34));
    assert_eq!(s.total_refunds, dec!(121.55));
    assert_eq!(s.total_commission, dec!(25.69));
    assert_eq!(s.invoice_amount, dec!(89.64));
    assert_eq!(s.payback_amount, dec!(149.50));
}

#[test]
fn refunds_merge_vat_and_duty_per_country() {
    let out = run(&ClientProfile::netherlands_broker(), &quarter(), &duty_rates()).unwrap();
    let refunds = &out.high_value.refunds;
    let countries: Vec<&str> = refunds.rows().iter().map(|r| r.country.as_str()).collect();
    assert_eq!(countries, ["DE", "IE", "NL"]);

    let de = refunds.get("DE").unwrap();
    assert_eq!(de.vat_refund, dec!(23.75));
    assert_eq!(de.duty_refund, dec!(10));
    assert_eq!(de.total_refund, dec!(33.75));
    assert_eq!(de.total_returned_value, dec!(125));
}

#[test]
fn commission_splits_every_refund() {
    let out = run(&ClientProfile::netherlands_broker(), &quarter(), &duty_rates()).unwrap();
    for table in [&out.low_value.revenue, &out.high_value.revenue] {
        for row in table.rows() {
            assert_eq!(row.revenue + row.counterparty_share, row.total_refund);
        }
    }
    assert_eq!(out.low_value.revenue.total_revenue(), dec!(1.6));
    assert_eq!(out.high_value.revenue.total_revenue(), dec!(24.09));
}

#[test]
fn vat_and_value_are_conserved() {
    let lines = quarter();
    let out = run(&ClientProfile::netherlands_broker(), &lines, &duty_rates()).unwrap();

    let classified = total_value(&out.classification.low_value)
        + total_value(&out.classification.high_value);
    let input: Decimal = lines.iter().map(|l| l.total_value()).sum();
    assert_eq!(classified, input);

    let hv = &out.high_value;
    assert_eq!(
        hv.oss_due.total_value() + hv.domestic_due.total_value(),
        total_value(&out.classification.high_value)
    );
    assert_eq!(
        hv.oss_refund.total_vat() + hv.domestic_refund.total_vat(),
        hv.vat_refund.total_vat()
    );
}

// --- Direct profile ---

#[test]
fn direct_profile_has_no_broker_or_domestic_tables() {
    let out = run(&ClientProfile::direct(), &quarter(), &duty_rates()).unwrap();
    assert_eq!(out.high_value.oss_due.vat_for("NL"), dec!(42));
    assert!(out.high_value.domestic_due.is_empty());
    assert!(out.high_value.domestic_refund.is_empty());
    assert_eq!(out.settlement.broker_paid_vat, Decimal::ZERO);
    assert_eq!(out.settlement.domestic_vat_return, Decimal::ZERO);
    assert_eq!(out.settlement.payback_amount, dec!(34));
}

// --- Custom configuration ---

#[test]
fn custom_rate_table_and_threshold() {
    let rates = RateTable::builder()
        .vat_rate("DE", dec!(0.19))
        .vat_rate("FR", dec!(0.20))
        .default_commission(dec!(0.25))
        .build()
        .unwrap();
    let profile = ClientProfile::direct()
        .with_rates(rates)
        .with_threshold(Threshold::new(dec!(22)).unwrap());
    let lines = vec![
        LineItemBuilder::new("P1", "FR", 1, dec!(40))
            .consignment_ref("M1")
            .goods_code("6204")
            .returned(1)
            .build(),
    ];
    let out = run(&profile, &lines, &duty_rates()).unwrap();
    assert_eq!(out.classification.high_value.len(), 1);

    let fr = out.high_value.revenue.get("FR").unwrap();
    // 40 × 0.20 VAT + 40 × 0.12 duty
    assert_eq!(fr.total_refund, dec!(12.8));
    assert_eq!(fr.revenue, dec!(3.2));
}

#[test]
fn pipeline_rejects_bad_profile_before_running() {
    let profile = ClientProfile::default()
        .with_domestic(Some(DomesticJurisdiction::new("NL", dec!(1.5))));
    let err = run(&profile, &quarter(), &duty_rates()).unwrap_err();
    assert!(matches!(err, ReclaimError::Config(_)));
}
