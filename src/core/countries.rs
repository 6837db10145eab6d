//! ISO 3166-1 alpha-2 country handling for consignee destinations.
//!
//! Destinations arrive from carrier exports in mixed case and with stray
//! whitespace. Everything downstream compares normalized codes.

/// EU member states (ISO 3166-1 alpha-2). Sorted for binary search.
static EU_MEMBER_STATES: &[&str] = &[
    "AT", "BE", "BG", "CY", "CZ", "DE", "DK", "EE", "ES", "FI", "FR", "GR", "HR", "HU", "IE", "IT",
    "LT", "LU", "LV", "MT", "NL", "PL", "PT", "RO", "SE", "SI", "SK",
];

/// Trim and uppercase a country code.
pub fn normalize_country(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Whether `code` (any case) is an EU member state.
pub fn is_eu_member(code: &str) -> bool {
    EU_MEMBER_STATES
        .binary_search(&normalize_country(code).as_str())
        .is_ok()
}
