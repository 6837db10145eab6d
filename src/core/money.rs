use rust_decimal::{Decimal, RoundingStrategy};

/// Round to `dp` decimal places, half away from zero (commercial rounding).
///
/// Only presentation code rounds; the engine keeps full precision.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount with exactly two decimals, e.g. `1234.5` → `"1234.50"`.
pub fn format_amount(value: Decimal) -> String {
    let rounded = round_half_up(value, 2);
    // Never print "-0.00".
    if rounded.is_zero() {
        return "0.00".to_string();
    }
    format!("{rounded:.2}")
}
