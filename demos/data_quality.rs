use dutyrefund::core::*;
use dutyrefund::engine::{Pipeline, run};
use rust_decimal_macros::dec;

fn main() {
    // ── 1. Configuration errors are rejected before anything runs ─────
    println!("=== Configuration ===");
    match Threshold::new(dec!(0)) {
        Ok(_) => println!("  threshold accepted"),
        Err(e) => println!("  {e}"),
    }
    let bad = ClientProfile::default()
        .with_domestic(Some(DomesticJurisdiction::new("LU", dec!(0.17))));
    if let Err(e) = Pipeline::new(&bad) {
        println!("  {e}");
    }
    if let Err(e) = LineItemBuilder::new("P1", "DE", 1, dec!(10)).returned(3).try_build() {
        println!("  {e}");
    }

    // ── 2. Data gaps are warnings, not failures ──────────────────────
    println!("\n=== Data quality ===");
    let lines = vec![
        LineItemBuilder::new("P1", "XK", 1, dec!(80)).build(),
        LineItemBuilder::new("P2", "DE", 1, dec!(400))
            .goods_code("9503000000")
            .returned(1)
            .build(),
        LineItemBuilder::new("P3", "IE", 1, dec!(400))
            .goods_code("6204629090")
            .returned(1)
            .build(),
    ];
    let duty_rates =
        DutyRateTable::from_entries([("6204", Some(dec!(0.12)))]).expect("duty rate within [0, 1]");
    let output = run(&ClientProfile::direct(), &lines, &duty_rates).expect("profile is valid");

    for warning in &output.warnings {
        println!("  [{}] {warning}", warning.key());
    }
    println!(
        "  duty refund {} on {} returned",
        format_amount(output.high_value.duty.total_duty()),
        format_amount(output.high_value.duty.total_returned_value())
    );
    println!(
        "  IE duty refund: {} (never reclaimed)",
        format_amount(output.high_value.duty.duty_for("IE"))
    );

    // ── 3. Structural checks ─────────────────────────────────────────
    println!("\n=== Structure ===");
    match output.classification.ensure_disjoint() {
        Ok(()) => println!(
            "  {} consignments, partitions disjoint",
            output.classification.consignment_count()
        ),
        Err(e) => println!("  {e}"),
    }
}
