use dutyrefund::core::*;
use dutyrefund::engine::run;
use dutyrefund::forms::*;
use rust_decimal_macros::dec;

fn main() {
    let lines = vec![
        LineItemBuilder::new("P1", "DE", 1, dec!(90)).build(),
        LineItemBuilder::new("P2", "DE", 2, dec!(125))
            .consignment_ref("M1")
            .goods_code("6109100010")
            .returned(1)
            .build(),
        LineItemBuilder::new("P3", "IE", 1, dec!(300))
            .consignment_ref("M2")
            .goods_code("6204629090")
            .returned(1)
            .build(),
        LineItemBuilder::new("P4", "NL", 1, dec!(400))
            .consignment_ref("M3")
            .goods_code("6204629090")
            .build(),
    ];
    let duty_rates = DutyRateTable::from_entries([
        ("6109100010", Some(dec!(0.12))),
        ("6204629090", Some(dec!(0.12))),
    ])
    .expect("duty rates within [0, 1]");

    let profile = ClientProfile::netherlands_broker();
    let output = run(&profile, &lines, &duty_rates).expect("profile is valid");
    let period: ReturnPeriod = "Q3 2024".parse().expect("valid period");

    match DomesticVatReturn::prepare(&profile, &output, period) {
        Ok(form) => println!("{}", form.render()),
        Err(e) => println!("No domestic return: {e}"),
    }
    println!("{}", OssReturn::prepare(&profile, &output, period).render());
    println!("{}", DutyReturnClaim::prepare(&profile, &output, period).render());
    println!("{}", FinancialSummary::prepare(&profile, &output, period).render());

    if let Some(domestic) = &profile.domestic {
        let diff = VatDifference::compute(&output.high_value.oss_due, domestic);
        for row in &diff.rows {
            println!(
                "  {}: paid {} in {}, owed {} at destination",
                row.country,
                format_amount(row.vat_paid_domestic),
                diff.domestic_country,
                format_amount(row.vat_paid_destination)
            );
        }
        println!("{}", diff.statement());
    }
}
