//! String helpers.

/// Cut `text` to at most `max_chars` characters.
///
/// Always cuts on a character boundary; text that is already short enough
/// is returned unchanged.
pub fn truncate_string(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii() {
        assert_eq!(truncate_string("hello world", 5), "hello");
        assert_eq!(truncate_string("hello", 5), "hello");
        assert_eq!(truncate_string("hello", 0), "");
    }

    #[test]
    fn test_multibyte() {
        assert_eq!(truncate_string("héllo", 2), "hé");
        assert_eq!(truncate_string("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_string("🦀🦀", 1), "🦀");
    }

    #[test]
    fn test_empty() {
        assert_eq!(truncate_string("", 10), "");
    }
}
