//! Number parsing and formatting for hiscores values.
//!
//! The hiscores pages and the level table both print integers with `,`
//! thousands separators ("13,034,431"). Rendered totals use the same style.

/// Parse an integer that may contain `,` thousands separators.
///
/// Surrounding whitespace is ignored. Returns `None` for anything that is
/// not a plain (optionally negative) integer once separators are removed.
pub fn parse_thousands(value: &str) -> Option<i64> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i64>().ok()
}

/// Format an integer with `,` thousands separators.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        out.push('-');
    }

    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Round a float to the nearest integer (ties to even) and format it with
/// separators.
///
/// Interpolated frames carry fractional values; the display shows none.
pub fn format_thousands_f64(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    format_thousands(value.round_ties_even() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thousands() {
        assert_eq!(parse_thousands("13,034,431"), Some(13_034_431));
        assert_eq!(parse_thousands("0"), Some(0));
        assert_eq!(parse_thousands(" 1,000 "), Some(1000));
        assert_eq!(parse_thousands("-1,500"), Some(-1500));
        assert_eq!(parse_thousands(""), None);
        assert_eq!(parse_thousands(","), None);
        assert_eq!(parse_thousands("12.5"), None);
        assert_eq!(parse_thousands("abc"), None);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(123_456), "123,456");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(-12_345), "-12,345");
    }

    #[test]
    fn test_format_thousands_f64_rounds() {
        assert_eq!(format_thousands_f64(1234.4), "1,234");
        assert_eq!(format_thousands_f64(1234.6), "1,235");
        assert_eq!(format_thousands_f64(1234.5), "1,234");
        assert_eq!(format_thousands_f64(1235.5), "1,236");
        assert_eq!(format_thousands_f64(-2.5), "-2");
        assert_eq!(format_thousands_f64(f64::NAN), "0");
    }
}
