//! Number formatting shared by the human-readable reporters.

use crate::scoring::RATE_PLACEHOLDER;

/// Format an amount with space-separated thousands, no decimals and a
/// currency suffix.
///
/// ```
/// use audit_tools::reports::figures::format_money;
///
/// assert_eq!(format_money(91_000.0, "€"), "91 000 €");
/// assert_eq!(format_money(1_234_567.4, "$"), "1 234 567 $");
/// assert_eq!(format_money(512.0, ""), "512");
/// ```
#[must_use]
pub fn format_money(amount: f64, currency: &str) -> String {
    if !amount.is_finite() {
        return RATE_PLACEHOLDER.to_string();
    }
    let rounded = amount.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    if currency.is_empty() {
        grouped
    } else {
        format!("{grouped} {currency}")
    }
}

/// Format a probability in `[0, 1]` as a whole percentage.
#[must_use]
pub fn format_probability(probability: f64) -> String {
    if probability.is_finite() {
        format!("{}%", (probability * 100.0).round() as i64)
    } else {
        RATE_PLACEHOLDER.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_grouping() {
        assert_eq!(format_money(0.0, "€"), "0 €");
        assert_eq!(format_money(999.5, "€"), "1 000 €");
        assert_eq!(format_money(36_400.0, "€"), "36 400 €");
        assert_eq!(format_money(-20_400.0, "€"), "-20 400 €");
        assert_eq!(format_money(f64::NAN, "€"), RATE_PLACEHOLDER);
    }

    #[test]
    fn test_probability_percent() {
        assert_eq!(format_probability(0.40), "40%");
        assert_eq!(format_probability(0.225), "23%");
        assert_eq!(format_probability(0.05), "5%");
    }
}
