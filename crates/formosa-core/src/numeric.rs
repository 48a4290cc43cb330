//! Parsing of provider-formatted numeric text.
//!
//! Providers render numbers with thousands separators, blank cells for
//! missing data, and occasionally two values packed into one cell
//! (`"123(4)"`). Parsing never fails loudly: malformed input is an absent
//! value, not an error, so a single bad cell nulls one field instead of
//! aborting the record.

/// Parse a raw cell into a finite number.
///
/// Strips thousands separators and surrounding whitespace. Empty, blank,
/// and non-numeric cells (`""`, `" "`, `"--"`) yield `None`. A literal
/// `"0"` parses to `Some(0.0)`: a zero balance is data, absence is not.
pub fn parse_decimal(cell: &str) -> Option<f64> {
    let cleaned: String = cell.trim().chars().filter(|ch| *ch != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Split a composite cell of the form `"primary(secondary)"`.
///
/// The breadth table packs limit-up/limit-down counts into the up/down
/// cells this way. Cells without a parenthetical yield `(primary, None)`.
pub fn split_composite(cell: &str) -> (Option<f64>, Option<f64>) {
    match cell.split_once('(') {
        Some((primary, rest)) => {
            let secondary = rest.trim_end().trim_end_matches(')');
            (parse_decimal(primary), parse_decimal(secondary))
        }
        None => (parse_decimal(cell), None),
    }
}
