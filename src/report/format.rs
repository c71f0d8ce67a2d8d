//! Currency and percentage formatting for display and export

/// Format an amount with dot thousands and comma decimals: `1.234,56`
pub fn format_brl(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, &digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit as char);
    }

    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}

/// Percentage with one decimal, or "N/A"
pub fn format_tax_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{r:.1}"),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(1234.56), "1.234,56");
        assert_eq!(format_brl(0.0), "0,00");
        assert_eq!(format_brl(999.999), "1.000,00");
        assert_eq!(format_brl(1_234_567.891), "1.234.567,89");
        assert_eq!(format_brl(100.0), "100,00");
        assert_eq!(format_brl(-42_728.914), "-42.728,91");
        assert_eq!(format_brl(-0.001), "0,00");
    }

    #[test]
    fn test_format_tax_rate() {
        assert_eq!(format_tax_rate(Some(17.5)), "17.5");
        assert_eq!(format_tax_rate(Some(15.0)), "15.0");
        assert_eq!(format_tax_rate(None), "N/A");
    }
}
