use dutyrefund::core::ClientProfile;
use dutyrefund::csv::*;
use dutyrefund::engine::run;

const CONSIGNMENTS: &str = "\
MRN,Parcel ID,HS CODE,Line Item Quantity Imported,Line Item Quantity Returned,Line Item Unit Price,Consignee Country
24NL0001,P1,6109100010,1,,100.00,DE
24NL0002,P2,6204629090,5,2,30.00,IE
24NL0002,P3,6204629090,1,0,150.00,IE
#N/A,P4,6403990000,1,1,250.00,NL
24NL0003,P5,6204629090,1,0,80.00,CH
24NL0004,P6,9503000000,2,1,120.00,AT
";

const DUTY_RATES: &str = "\
goods_code,rate
6204629090,0.12
6403990000,0.17
6109100010,
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let profile = ClientProfile::default();
    let (lines, summary) = read_line_items(CONSIGNMENTS.as_bytes(), &profile)?;
    println!(
        "Read {} rows: {} line items, {} dropped ({:?})",
        summary.rows_read,
        summary.line_items,
        summary.rows_excluded(),
        summary.excluded
    );

    let duty_rates = read_duty_rates(DUTY_RATES.as_bytes())?;
    let output = run(&profile, &lines, &duty_rates)?;

    let dir = std::env::temp_dir().join("dutyrefund-demo");
    let writer = ReportWriter::new(&dir)?;
    for path in writer.write_all(&output)? {
        println!("  wrote {}", path.display());
    }

    for warning in &output.warnings {
        println!("warning: {warning}");
    }
    print!("{}", output.settlement.render());
    Ok(())
}
