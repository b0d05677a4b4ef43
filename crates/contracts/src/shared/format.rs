//! Number formatting shared by backend labels and frontend cards.

/// Formats a number with `,` thousands separators and a fixed number of decimals.
///
/// # Examples
/// ```
/// use contracts::shared::format::format_grouped;
/// assert_eq!(format_grouped(1234567.891, 1), "1,234,567.9");
/// assert_eq!(format_grouped(-1234.0, 0), "-1,234");
/// assert_eq!(format_grouped(12.0, 1), "12.0");
/// ```
pub fn format_grouped(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (formatted.as_str(), None),
    };

    let mut reversed = String::with_capacity(integer_part.len() + integer_part.len() / 3);
    for (i, ch) in integer_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            reversed.push(',');
        }
        reversed.push(ch);
    }
    let mut result: String = reversed.chars().rev().collect();

    if let Some(d) = decimal_part {
        result.push('.');
        result.push_str(d);
    }

    if value < 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Formats a percentage value, e.g. `14.3%`.
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value)
}

/// Formats an amount followed by its unit label, e.g. `12.0 백만원`.
pub fn format_amount(value: f64, decimals: usize, unit_label: &str) -> String {
    format!("{} {}", format_grouped(value, decimals), unit_label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(0.0, 0), "0");
        assert_eq!(format_grouped(999.0, 0), "999");
        assert_eq!(format_grouped(1000.0, 0), "1,000");
        assert_eq!(format_grouped(1234567.0, 0), "1,234,567");
        assert_eq!(format_grouped(200.0, 1), "200.0");
        assert_eq!(format_grouped(-14.1, 1), "-14.1");
        assert_eq!(format_grouped(25000000.0, 0), "25,000,000");
    }

    #[test]
    fn test_format_grouped_rounding_carries_into_groups() {
        assert_eq!(format_grouped(999.96, 1), "1,000.0");
    }

    #[test]
    fn test_format_grouped_non_finite() {
        assert_eq!(format_grouped(f64::INFINITY, 1), "inf");
        assert_eq!(format_grouped(f64::NAN, 1), "NaN");
    }

    #[test]
    fn test_format_percent_and_amount() {
        assert_eq!(format_percent(10.425, 1), "10.4%");
        assert_eq!(format_percent(-3.0, 1), "-3.0%");
        assert_eq!(format_amount(20.5, 1, "백만원"), "20.5 백만원");
    }
}
