use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::{ClientProfile, ReturnPeriod, format_amount};
use crate::engine::PipelineOutput;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DutyClaimRow {
    pub country: String,
    pub total_returned_value: Decimal,
    pub total_duty: Decimal,
}

/// Claim to customs for duty paid on goods that were returned.
///
/// Filed separately from the VAT returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DutyReturnClaim {
    pub period: ReturnPeriod,
    pub rows: Vec<DutyClaimRow>,
    /// Countries whose duty cannot be reclaimed.
    pub excluded_countries: Vec<String>,
}

impl DutyReturnClaim {
    pub fn prepare(profile: &ClientProfile, output: &PipelineOutput, period: ReturnPeriod) -> Self {
        let rows = output
            .high_value
            .duty
            .rows()
            .iter()
            .map(|r| DutyClaimRow {
                country: r.country.clone(),
                total_returned_value: r.total_returned_value,
                total_duty: r.total_duty,
            })
            .collect();
        Self {
            period,
            rows,
            excluded_countries: profile
                .rates
                .duty_excluded_countries()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn total_duty(&self) -> Decimal {
        self.rows.iter().map(|r| r.total_duty).sum()
    }

    pub fn total_returned_value(&self) -> Decimal {
        self.rows.iter().map(|r| r.total_returned_value).sum()
    }

    /// e.g. `IE excluded - duty cannot be reclaimed from IE`.
    pub fn note(&self) -> Option<String> {
        if self.excluded_countries.is_empty() {
            return None;
        }
        let list = self.excluded_countries.join(", ");
        Some(format!("{list} excluded - duty cannot be reclaimed from {list}"))
    }

    pub fn render(&self) -> String {
        let mut out = format!("DUTY RETURN CLAIM {}\n", self.period);
        let _ = writeln!(out, "{:<8}{:>16}{:>14}", "Country", "Returned", "Duty");
        for r in &self.rows {
            let _ = writeln!(
                out,
                "{:<8}{:>16}{:>14}",
                r.country,
                format_amount(r.total_returned_value),
                format_amount(r.total_duty)
            );
        }
        let _ = writeln!(
            out,
            "{:<8}{:>16}{:>14}",
            "Total",
            format_amount(self.total_returned_value()),
            format_amount(self.total_duty())
        );
        if let Some(note) = self.note() {
            let _ = writeln!(out, "Note: {note}");
        }
        out
    }
}
