//! Run command - full settlement over one consignment export.

use std::path::PathBuf;

use clap::Args;
use tracing::{info, warn};

use dutyrefund::core::{DutyRateTable, ReturnPeriod};
use dutyrefund::csv::{ReportWriter, read_duty_rates_from_path, read_line_items_from_path};
use dutyrefund::engine::Pipeline;
use dutyrefund::forms::{
    DomesticVatReturn, DutyReturnClaim, FinancialSummary, OssReturn, VatDifference,
};

#[derive(Args)]
pub struct RunArgs {
    /// Consignment line CSV
    #[arg(short, long)]
    input: PathBuf,

    /// Duty rates CSV (goods_code,rate); without it no duty is reclaimed
    #[arg(short, long)]
    duty_rates: Option<PathBuf>,

    /// Client profile JSON (defaults to the Dutch-broker profile)
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Return period for the forms, e.g. "Q3 2024"
    #[arg(long)]
    period: Option<ReturnPeriod>,

    /// Directory for CSV reports
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail when data-quality warnings are found
    #[arg(long)]
    strict: bool,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let profile = super::load_profile(args.profile.as_deref())?;
    let pipeline = Pipeline::new(&profile)?;

    let (lines, summary) = read_line_items_from_path(&args.input, &profile)?;
    info!(
        "{}: {} line items, {} rows excluded",
        args.input.display(),
        summary.line_items,
        summary.rows_excluded()
    );

    let duty_rates = match &args.duty_rates {
        Some(path) => read_duty_rates_from_path(path)?,
        None => {
            warn!("No duty rates given; duty refunds will be zero");
            DutyRateTable::new()
        }
    };

    let output = pipeline.run(&lines, &duty_rates)?;

    if let Some(dir) = &args.output {
        let writer = ReportWriter::new(dir)?;
        let written = writer.write_all(&output)?;
        println!("Wrote {} reports to {}", written.len(), writer.dir().display());
    }

    println!("{}", output.settlement.render());

    if let Some(period) = args.period {
        if profile.domestic.is_some() {
            println!("{}", DomesticVatReturn::prepare(&profile, &output, period)?.render());
        }
        println!("{}", OssReturn::prepare(&profile, &output, period).render());
        println!("{}", DutyReturnClaim::prepare(&profile, &output, period).render());
        println!("{}", FinancialSummary::prepare(&profile, &output, period).render());
    }

    if let Some(domestic) = &profile.domestic {
        println!(
            "{}",
            VatDifference::compute(&output.high_value.oss_due, domestic).statement()
        );
    }

    for w in &output.warnings {
        eprintln!("warning: {w}");
    }
    if args.strict && output.has_warnings() {
        anyhow::bail!(
            "{} data-quality warnings (strict mode)",
            output.warnings.len()
        );
    }

    Ok(())
}
