//! Conversation title derivation.
//!
//! New conversations are titled from the first line of the opening user
//! message, truncated to a fixed character bound with an ellipsis marker.

/// Maximum title length in characters, excluding the ellipsis.
const TITLE_MAX_CHARS: usize = 50;

/// Appended when the first line exceeds [`TITLE_MAX_CHARS`].
const ELLIPSIS: char = '…';

/// Derive a conversation title from the opening user message.
///
/// Takes the first non-empty line, trims it, and truncates to
/// [`TITLE_MAX_CHARS`] characters (char-boundary safe) with `…` appended
/// when truncated. A message with no printable content yields "New chat".
pub fn derive(message: &str) -> String {
    let first_line = message
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    if first_line.is_empty() {
        return "New chat".to_string();
    }

    let mut chars = first_line.chars();
    let title: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{title}{ELLIPSIS}")
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_is_kept_verbatim() {
        assert_eq!(derive("Explain recursion"), "Explain recursion");
    }

    #[test]
    fn test_exactly_fifty_chars_not_truncated() {
        let message = "a".repeat(50);
        assert_eq!(derive(&message), message);
    }

    #[test]
    fn test_long_message_truncated_with_ellipsis() {
        let message = "a".repeat(60);
        let title = derive(&message);
        assert_eq!(title.chars().count(), 51);
        assert!(title.ends_with('…'));
        assert!(title.starts_with(&"a".repeat(50)));
    }

    #[test]
    fn test_first_line_only() {
        assert_eq!(derive("How do I sort a Vec?\nHere is my code..."), "How do I sort a Vec?");
    }

    #[test]
    fn test_leading_blank_lines_skipped() {
        assert_eq!(derive("\n\n  hello  \nmore"), "hello");
    }

    #[test]
    fn test_unicode_truncation_is_char_safe() {
        let message = "é".repeat(60);
        let title = derive(&message);
        assert_eq!(title.chars().count(), 51);
        assert!(title.ends_with('…'));
    }

    #[test]
    fn test_blank_message_falls_back() {
        assert_eq!(derive("   \n  "), "New chat");
    }
}
