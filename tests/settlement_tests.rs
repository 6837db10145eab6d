#![cfg(feature = "engine")]

use dutyrefund::core::*;
use dutyrefund::engine::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn quarter_output() -> PipelineOutput {
    let lines = vec![
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
    ];
    let duty = DutyRateTable::from_entries([
        ("6204629090", Some(dec!(0.12))),
        ("6109100010", Some(dec!(0.08))),
    ])
    .unwrap();
    run(&ClientProfile::netherlands_broker(), &lines, &duty).unwrap()
}

#[test]
fn settlement_statement_snapshot() {
    let report = quarter_output().settlement;
    insta::assert_snapshot!(report.render(), @r"
    SETTLEMENT
    IOSS sales VAT                   35.00
    IOSS returns VAT                  8.00
    Net IOSS                         27.00
    OSS sales VAT                   116.50
    OSS returns VAT                  37.55
    Net OSS                          78.95
    Broker paid VAT                 157.50
    Broker reclaimable VAT          115.50
    Domestic VAT return              42.00
    High-value VAT refund            79.55
    Total duty refund                34.00
    Total refunds                   121.55
    Total commission                 25.69
    Invoice amount                   89.64
    Payback amount                  149.50
    ");
}

#[test]
fn lines_follow_presentation_order() {
    let report = quarter_output().settlement;
    let labels: Vec<&str> = report.lines().iter().map(|l| l.label).collect();
    assert_eq!(labels.len(), 15);
    assert_eq!(labels.first(), Some(&"IOSS sales VAT"));
    assert_eq!(&labels[labels.len() - 2..], &["Invoice amount", "Payback amount"]);
    assert!(report.lines().iter().all(|l| !l.description.is_empty()));
}

#[test]
fn calculator_on_hand_built_inputs() {
    let empty_due = VatDueTable::default();
    let empty_refund = VatRefundTable::default();
    let duty = DutyRefundTable::default();
    let refunds = RefundTable::default();
    let revenue = RevenueTable::default();

    let report = SettlementCalculator::calculate(&SettlementInputs {
        ioss_due: &empty_due,
        ioss_refund: &empty_refund,
        oss_due: &empty_due,
        oss_refund: &empty_refund,
        domestic_refund: &empty_refund,
        broker: BrokerVat {
            paid: dec!(50),
            reclaimable: dec!(30),
        },
        duty: &duty,
        high_value_refunds: &refunds,
        ioss_revenue: &revenue,
        high_value_revenue: &revenue,
    });
    assert_eq!(report.invoice_amount, Decimal::ZERO);
    assert_eq!(report.payback_amount, dec!(30));
    assert_eq!(report.broker_paid_vat, dec!(50));
}

#[test]
fn negative_net_position_stays_negative() {
    // A fully returned domestic sale: the VAT return exceeds everything due.
    let lines = vec![
        LineItemBuilder::new("P1", "NL", 1, dec!(400))
            .consignment_ref("M1")
            .goods_code("6204")
            .returned(1)
            .build(),
    ];
    let duty = DutyRateTable::from_entries([("6204", Some(dec!(0.12)))]).unwrap();
    let out = run(&ClientProfile::netherlands_broker(), &lines, &duty).unwrap();
    let s = &out.settlement;
    // 0 + 0 − 84 + (84 + 48) × 0.20
    assert_eq!(s.domestic_vat_return, dec!(84));
    assert_eq!(s.total_commission, dec!(26.4));
    assert_eq!(s.invoice_amount, dec!(-57.6));
    assert!(s.render().contains("-57.60"));
}

#[test]
fn broker_retained_is_domestic_share() {
    let broker = BrokerVat {
        paid: dec!(157.50),
        reclaimable: dec!(115.50),
    };
    assert_eq!(broker.retained(), dec!(42));
}
