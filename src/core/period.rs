//! Quarterly VAT return periods.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::ReclaimError;

/// A calendar quarter, the filing unit for IOSS, OSS and domestic returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReturnPeriod {
    year: i32,
    quarter: u8,
}

impl ReturnPeriod {
    /// Create a period; `quarter` must be 1–4.
    pub fn new(year: i32, quarter: u8) -> Result<Self, ReclaimError> {
        if !(1..=4).contains(&quarter) {
            return Err(ReclaimError::Config(format!(
                "quarter must be 1-4, got {quarter}"
            )));
        }
        if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
            return Err(ReclaimError::Config(format!("year {year} out of range")));
        }
        Ok(Self { year, quarter })
    }

    /// The quarter containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: (date.month0() / 3 + 1) as u8,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    pub fn first_day(&self) -> NaiveDate {
        first_of_month(self.year, self.first_month())
    }

    pub fn last_day(&self) -> NaiveDate {
        last_of_month(self.year, self.first_month() + 2)
    }

    /// Last day of the month following the quarter.
    pub fn payment_deadline(&self) -> NaiveDate {
        let end = self.first_month() + 2;
        if end == 12 {
            last_of_month(self.year + 1, 1)
        } else {
            last_of_month(self.year, end + 1)
        }
    }

    /// File-name friendly form, e.g. `Q3_2024`.
    pub fn file_tag(&self) -> String {
        format!("Q{}_{}", self.quarter, self.year)
    }

    fn first_month(&self) -> u32 {
        u32::from(self.quarter - 1) * 3 + 1
    }
}

// Quarter and year are validated on construction, so these dates exist.
fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn last_of_month(year: i32, month: u32) -> NaiveDate {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).unwrap_or(NaiveDate::MAX)
}

impl fmt::Display for ReturnPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} {}", self.quarter, self.year)
    }
}

impl FromStr for ReturnPeriod {
    type Err = ReclaimError;

    /// Accepts `Q3 2024`, `Q3_2024`, `Q3-2024` and `2024-Q3` (any case).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ReclaimError::Config(format!(
                "invalid return period '{s}', expected e.g. 'Q3 2024'"
            ))
        };
        let parts: Vec<&str> = s
            .trim()
            .split(|c: char| c == ' ' || c == '_' || c == '-')
            .filter(|p| !p.is_empty())
            .collect();
        let [a, b] = parts.as_slice() else {
            return Err(invalid());
        };
        let (q, y) = if a.starts_with(['Q', 'q']) { (a, b) } else { (b, a) };
        let quarter = q
            .strip_prefix(['Q', 'q'])
            .and_then(|n| n.parse::<u8>().ok())
            .ok_or_else(invalid)?;
        let year = y.parse::<i32>().map_err(|_| invalid())?;
        Self::new(year, quarter)
    }
}
