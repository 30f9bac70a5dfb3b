//! Utility functions and helpers.

pub mod fs;

use std::borrow::Cow;

/// Decode `%XX` escapes.
///
/// Malformed escapes are kept as-is and invalid UTF-8 is replaced, so
/// decoding never fails.
pub fn percent_decode(input: &str) -> Cow<'_, str> {
    match urlencoding::decode_binary(input.as_bytes()) {
        Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode_user_agent() {
        assert_eq!(
            percent_decode(
                "Mozilla/5.0%20(compatible;%20SemrushBot/7%7Ebl;%20+http://www.semrush.com/bot.html)"
            ),
            "Mozilla/5.0 (compatible; SemrushBot/7~bl; +http://www.semrush.com/bot.html)"
        );
    }

    #[test]
    fn test_percent_decode_passthrough() {
        assert!(matches!(percent_decode("curl/8.0"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_percent_decode_malformed() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz%4"), "%zz%4");
        assert_eq!(percent_decode("%41%42"), "AB");
    }

    #[test]
    fn test_percent_decode_invalid_utf8_is_replaced() {
        assert_eq!(percent_decode("caf%E9"), "caf\u{FFFD}");
        assert_eq!(percent_decode("caf%C3%A9"), "café");
    }
}
