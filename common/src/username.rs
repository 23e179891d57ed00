//! Validation for Telegram account handles.

/// Minimum handle length accepted by Telegram.
pub const MIN_LEN: usize = 5;
/// Maximum handle length accepted by Telegram.
pub const MAX_LEN: usize = 32;

/// Strip surrounding whitespace and a single leading `@`.
pub fn normalize(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed)
}

/// True when `handle` is 5-32 ASCII letters, digits, or underscores.
pub fn is_valid(handle: &str) -> bool {
    (MIN_LEN..=MAX_LEN).contains(&handle.len())
        && handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_handles() {
        assert!(is_valid("durov"));
        assert!(is_valid("star_buyer_99"));
        assert!(is_valid(&"a".repeat(32)));
    }

    #[test]
    fn rejects_bad_lengths() {
        assert!(!is_valid(""));
        assert!(!is_valid("abcd"));
        assert!(!is_valid(&"a".repeat(33)));
    }

    #[test]
    fn rejects_non_ascii_and_punctuation() {
        assert!(!is_valid("has space"));
        assert!(!is_valid("dash-ed"));
        assert!(!is_valid("звёзды"));
    }

    #[test]
    fn normalize_strips_at_and_whitespace() {
        assert_eq!(normalize("  @durov "), "durov");
        assert_eq!(normalize("durov"), "durov");
        // Only one leading @ is stripped
        assert_eq!(normalize("@@durov"), "@durov");
    }
}
