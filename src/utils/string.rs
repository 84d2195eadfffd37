//! String utility functions for safe UTF-8 text manipulation and lexical matching

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Safely truncate a string at a character boundary, adding ellipsis if truncated.
///
/// Unlike naive byte slicing (`&s[..n]`), this function ensures we don't slice
/// in the middle of a multi-byte UTF-8 character, which would cause a panic.
///
/// # Examples
/// ```
/// use guardian_core::utils::string::truncate_at_char_boundary;
///
/// assert_eq!(truncate_at_char_boundary("hello world", 5), "hello...");
/// assert_eq!(truncate_at_char_boundary("hello", 10), "hello");
/// assert_eq!(truncate_at_char_boundary("hello→world", 6), "hello→...");
/// ```
pub fn truncate_at_char_boundary(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();

    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

/// Keep at most `max_chars` characters, without any marker.
pub fn take_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Lowercased word tokens of `text`, in order of appearance.
pub fn words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lowercased word set of `text`.
pub fn word_set(text: &str) -> HashSet<String> {
    words(text).into_iter().collect()
}

/// Jaccard similarity of two word sets.
///
/// Returns 0.0 when either side is empty.
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.union(b).count();

    intersection as f64 / union as f64
}
