//! Resume tokenization and text helpers

use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Lower-cased, whitespace-split, deduplicated tokens in first-seen order.
///
/// Punctuation is kept ("rust," stays "rust,"), so downstream matching has to
/// use substring containment rather than equality.
pub fn tokenize_resume(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();

    for word in text.split_whitespace() {
        let token = word.to_lowercase();
        if seen.insert(token.clone()) {
            tokens.push(token);
        }
    }
    tokens
}

/// Cut text to at most `max_chars` characters without splitting a grapheme cluster
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    let mut count = 0;
    for (offset, grapheme) in text.grapheme_indices(true) {
        let width = grapheme.chars().count();
        if count + width > max_chars {
            return &text[..offset];
        }
        count += width;
    }
    text
}

/// Order-preserving deduplication
pub fn dedupe_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_dedupes() {
        let tokens = tokenize_resume("Rust  Engineer\nrust, SQL\n\n  Rust\tKubernetes ");
        assert_eq!(tokens, vec!["rust", "engineer", "rust,", "sql", "kubernetes"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize_resume("").is_empty());
        assert!(tokenize_resume(" \n\t ").is_empty());
    }

    #[test]
    fn test_truncate_respects_limits() {
        assert_eq!(truncate_chars("abcdef", 4), "abcd");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        // a combining sequence is never split
        assert_eq!(truncate_chars("ae\u{301}x", 2), "a");
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let items = vec!["sql".to_string(), "git".to_string(), "sql".to_string()];
        assert_eq!(dedupe_preserving_order(items), vec!["sql", "git"]);
    }
}
