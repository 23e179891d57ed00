//! Ruble amounts. Prices are always stored internally in kopecks (`u64`);
//! floats never touch stored state.

/// Format a kopeck amount as rubles with two decimal places, e.g. `172.00`.
pub fn format_kopecks(amount: u64) -> String {
    format!("{}.{:02}", amount / 100, amount % 100)
}

/// Parse a ruble amount like `1.72`, `2`, or `0.5` into kopecks.
///
/// Returns `None` for empty input, more than two decimal places, or
/// anything non-numeric.
pub fn parse_rubles(input: &str) -> Option<u64> {
    let input = input.trim();
    let (whole, frac) = match input.split_once('.') {
        Some((w, f)) => (w, f),
        None => (input, ""),
    };
    if whole.is_empty() || frac.len() > 2 {
        return None;
    }
    let rubles: u64 = whole.parse().ok()?;
    let kopecks: u64 = if frac.is_empty() {
        0
    } else {
        let parsed: u64 = frac.parse().ok()?;
        // "5" means 50 kopecks, "05" means 5
        if frac.len() == 1 {
            parsed * 10
        } else {
            parsed
        }
    };
    Some(rubles * 100 + kopecks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_two_decimal_places() {
        assert_eq!(format_kopecks(17200), "172.00");
        assert_eq!(format_kopecks(172), "1.72");
        assert_eq!(format_kopecks(5), "0.05");
        assert_eq!(format_kopecks(0), "0.00");
    }

    #[test]
    fn parses_ruble_strings() {
        assert_eq!(parse_rubles("1.72"), Some(172));
        assert_eq!(parse_rubles("2"), Some(200));
        assert_eq!(parse_rubles("0.5"), Some(50));
        assert_eq!(parse_rubles("0.05"), Some(5));
        assert_eq!(parse_rubles(" 10.00 "), Some(1000));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_rubles(""), None);
        assert_eq!(parse_rubles("."), None);
        assert_eq!(parse_rubles("1.725"), None);
        assert_eq!(parse_rubles("abc"), None);
        assert_eq!(parse_rubles("-1"), None);
    }

    #[test]
    fn format_parse_round_trip() {
        for amount in [0u64, 1, 99, 100, 172, 17200] {
            assert_eq!(parse_rubles(&format_kopecks(amount)), Some(amount));
        }
    }
}
