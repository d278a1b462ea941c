//! Lenient parsing of the numeric text fields in forms.
//!
//! Numbers typed into the card and transaction forms are never rejected:
//! text that is not a number is read as zero.

/// Parse a money amount, accepting either `.` or `,` as the decimal separator.
///
/// Returns `0.0` if `text` is not a finite number.
pub fn parse_amount(text: &str) -> f64 {
    let normalized = text.trim().replace(',', ".");

    match normalized.parse::<f64>() {
        Ok(amount) if amount.is_finite() => amount,
        _ => {
            if !normalized.is_empty() {
                tracing::debug!("Could not parse amount {text:?}, using 0 instead");
            }
            0.0
        }
    }
}

/// Parse a whole number credit limit.
///
/// Returns `0` if `text` is not an integer.
pub fn parse_limit(text: &str) -> i64 {
    let text = text.trim();

    text.parse().unwrap_or_else(|_| {
        if !text.is_empty() {
            tracing::debug!("Could not parse limit {text:?}, using 0 instead");
        }
        0
    })
}
