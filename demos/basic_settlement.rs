use dutyrefund::core::*;
use dutyrefund::engine::run;
use rust_decimal_macros::dec;

fn main() {
    // One low-value parcel to Germany, one high-value consignment to
    // Ireland with two of five units sent back, one parcel kept in NL.
    let lines = vec![
        LineItemBuilder::new("P1", "DE", 1, dec!(100))
            .consignment_ref("24NL0000000001")
            .goods_code("6109100010")
            .build(),
        LineItemBuilder::new("P2", "IE", 5, dec!(30))
            .consignment_ref("24NL0000000002")
            .goods_code("6204629090")
            .returned(2)
            .build(),
        LineItemBuilder::new("P3", "IE", 1, dec!(150))
            .consignment_ref("24NL0000000002")
            .goods_code("6204629090")
            .build(),
        LineItemBuilder::new("P4", "NL", 1, dec!(200))
            .consignment_ref("24NL0000000003")
            .goods_code("6403990000")
            .returned(1)
            .build(),
    ];

    let duty_rates = DutyRateTable::from_entries([
        ("6204629090", Some(dec!(0.12))),
        ("6403990000", Some(dec!(0.17))),
    ])
    .expect("duty rates within [0, 1]");

    let profile = ClientProfile::netherlands_broker();
    let output = run(&profile, &lines, &duty_rates).expect("profile is valid");

    println!("Profile: {}", profile.name);
    println!(
        "Consignments: {} low value, {} high value",
        output.classification.low_value.len(),
        output.classification.high_value.len()
    );
    println!("---");
    println!("IOSS VAT due:");
    for row in output.low_value.vat_due.rows() {
        println!(
            "  {} @ {}: {} on {}",
            row.country,
            row.vat_rate,
            format_amount(row.total_vat),
            format_amount(row.total_value)
        );
    }
    println!("High-value refunds:");
    for row in output.high_value.refunds.rows() {
        println!(
            "  {}: VAT {} + duty {} = {}",
            row.country,
            format_amount(row.vat_refund),
            format_amount(row.duty_refund),
            format_amount(row.total_refund)
        );
    }
    println!("Commission:");
    for row in output.high_value.revenue.rows() {
        println!(
            "  {} ({}): agent {} / counterparty {}",
            row.country,
            row.commission_rate,
            format_amount(row.revenue),
            format_amount(row.counterparty_share)
        );
    }
    println!("---");
    print!("{}", output.settlement.render());
}
