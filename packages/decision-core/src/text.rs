//! Text normalization shared by the keyword and lexical heuristics.

use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use unicode_segmentation::UnicodeSegmentation;

/// Words that carry no signal for lexical overlap.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "into", "is", "it",
    "its", "of", "on", "or", "our", "that", "the", "their", "this", "to", "we", "with", "who",
    "will", "has", "have", "was", "were", "which", "also", "all", "across", "through",
];

/// Lowercase, replace punctuation with spaces, collapse whitespace.
///
/// "Government-funded, 200-bed" becomes "government funded 200 bed".
/// Works on grapheme clusters, so viramas and vowel signs stay attached
/// to their base letter in Telugu and Devanagari text.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .graphemes(true)
        .map(|g| match g.chars().next() {
            Some(c) if c.is_alphanumeric() => g,
            _ => " ",
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole-word phrase test against already-normalized text.
pub fn contains_phrase(normalized_text: &str, phrase: &str) -> bool {
    let phrase = normalize(phrase);
    if phrase.is_empty() {
        return false;
    }
    let haystack = format!(" {} ", normalized_text);
    haystack.contains(&format!(" {} ", phrase))
}

/// Phrases from `keywords` present in `normalized_text`, in table order.
pub fn matched_phrases<'k>(normalized_text: &str, keywords: &[&'k str]) -> Vec<&'k str> {
    keywords
        .iter()
        .copied()
        .filter(|k| contains_phrase(normalized_text, k))
        .collect()
}

/// Distinct content tokens, sorted.
pub fn content_tokens(text: &str) -> BTreeSet<String> {
    normalize(text)
        .split(' ')
        .filter(|t| t.len() > 1 && !STOPWORDS.contains(t))
        .map(|t| t.to_string())
        .collect()
}

/// SHA-256 of the normalized text, hex encoded.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(text).as_bytes());
    format!("{:x}", hasher.finalize())
}
