//! Spoken-query token pipeline.
//!
//! Turns a raw guest utterance into the deduplicated term list fed to the
//! full-text index, in three stages:
//!
//! 1. **Normalize** – strip control characters, neutralise punctuation the
//!    full-text query syntax would treat as operators, lowercase, tokenize,
//!    and drop stop words and single-character tokens.
//! 2. **Correct** – snap near-miss tokens onto a closed vocabulary of known
//!    catalog terms using Jaro–Winkler similarity (0–100 scale, accepted at
//!    [`SIMILARITY_THRESHOLD`] or above).
//! 3. **Expand** – append concrete catalog terms for intent words
//!    ("thirsty" → water/drink/…), then deduplicate preserving first-seen
//!    order, which fixes each term's relative weight in the downstream
//!    OR-query.
//!
//! Every stage is pure and total: no input can make the pipeline fail.
//!
//! # Example
//!
//! ```rust
//! use waypost_cache::query::search_terms;
//!
//! let terms = search_terms("Where can I get diesel fuel?");
//! assert_eq!(terms, vec!["diesel".to_string(), "fuel".to_string()]);
//! ```

use once_cell::sync::Lazy;
use std::collections::HashSet;

// ─────────────────────────────────────────────────────────────────────────────
// Static tables
// ─────────────────────────────────────────────────────────────────────────────

/// Characters the full-text query parser treats as operators. Replaced with
/// whitespace before tokenization so guest punctuation can never be
/// interpreted as query syntax.
const RESERVED_CHARS: &[char] = &[
    '"', '\'', '*', '?', '(', ')', '[', ']', ',', '!', ';', ':',
];

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "could", "do",
    "does", "for", "from", "get", "has", "have", "he", "her", "his", "how",
    "i", "if", "in", "is", "it", "me", "my", "of", "on", "or", "our", "she",
    "should", "so", "some", "that", "the", "their", "them", "there", "they",
    "this", "to", "up", "we", "what", "when", "where", "which", "who",
    "will", "with", "you", "your",
];

static STOP_WORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Curated vocabulary of known catalog terms used for typo correction.
pub const VOCABULARY: &[&str] = &[
    "diesel", "fuel", "coffee", "shower", "radio", "tire", "oil", "battery",
    "snack", "energy", "burger", "pizza", "sandwich", "water", "wash",
    "parking", "vest", "flashlight", "chain", "gloves", "tarp", "strap",
    "logbook", "gps", "headset", "jerky", "nuts", "donut", "muffin",
    "chicken", "taco", "chili", "salad",
];

/// Intent words expanded into concrete catalog terms.
const EXPANSIONS: &[(&str, &[&str])] = &[
    ("hungry", &["food", "meal", "snack", "pizza", "burger", "sandwich", "chicken"]),
    ("thirsty", &["water", "drink", "beverage", "coffee", "soda"]),
    ("tired", &["energy", "coffee", "caffeine"]),
    ("eat", &["food", "meal", "snack"]),
    ("drink", &["beverage", "water", "coffee", "soda"]),
];

/// Minimum 0–100 similarity score for a vocabulary substitution.
pub const SIMILARITY_THRESHOLD: f64 = 75.0;

// ─────────────────────────────────────────────────────────────────────────────
// Normalizer
// ─────────────────────────────────────────────────────────────────────────────

fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control())
        .map(|c| if RESERVED_CHARS.contains(&c) { ' ' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Normalize a raw utterance into lowercase keyword tokens.
///
/// Stop words and single-character tokens are removed. Empty or
/// whitespace-only input yields an empty list.
pub fn normalize(raw: &str) -> Vec<String> {
    sanitize(raw)
        .split_whitespace()
        .filter(|token| token.chars().count() > 1 && !STOP_WORD_SET.contains(token))
        .map(str::to_string)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Typo corrector
// ─────────────────────────────────────────────────────────────────────────────

/// Correct a single token against the built-in [`VOCABULARY`].
pub fn correct(token: &str) -> String {
    correct_against(token, VOCABULARY)
}

/// Correct `token` against `vocabulary`.
///
/// Substitutes the best-scoring vocabulary term when it scores at or above
/// [`SIMILARITY_THRESHOLD`] **and** differs from the token; otherwise the
/// token is returned unchanged. A stateless per-token transform with no
/// cross-token context; an empty token or vocabulary returns the input
/// unchanged.
pub fn correct_against(token: &str, vocabulary: &[&str]) -> String {
    if token.is_empty() || vocabulary.is_empty() {
        return token.to_string();
    }
    let mut best: Option<(&str, f64)> = None;
    for term in vocabulary {
        let score = strsim::jaro_winkler(token, term) * 100.0;
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((term, score));
        }
    }
    match best {
        Some((term, score)) if score >= SIMILARITY_THRESHOLD && term != token => {
            tracing::debug!(original = token, corrected = term, score, "typo corrected");
            term.to_string()
        }
        _ => token.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Synonym expander
// ─────────────────────────────────────────────────────────────────────────────

/// Expand intent words into concrete catalog terms.
///
/// Each token is emitted first, followed by its mapped expansion terms in
/// map order. The result is deduplicated preserving first-seen order, since
/// duplicate terms are not re-weighted by the OR-query downstream.
pub fn expand(tokens: &[String]) -> Vec<String> {
    let mut expanded = Vec::new();
    for token in tokens {
        expanded.push(token.clone());
        if let Some((_, terms)) = EXPANSIONS.iter().find(|(intent, _)| *intent == token.as_str()) {
            expanded.extend(terms.iter().map(|t| (*t).to_string()));
        }
    }
    dedup_preserving_order(expanded)
}

fn dedup_preserving_order(tokens: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Full pipeline
// ─────────────────────────────────────────────────────────────────────────────

/// Run the full normalize → correct → expand pipeline.
///
/// When stop-word removal leaves no tokens at all, the sanitized
/// whitespace-split tokens are returned instead so at least one probe is
/// attempted. An empty or whitespace-only utterance yields an empty list.
pub fn search_terms(raw: &str) -> Vec<String> {
    let tokens = normalize(raw);
    if tokens.is_empty() {
        // All words were stop words or too short: fall back to the sanitized
        // split. Reserved punctuation is still neutralised.
        return sanitize(raw)
            .split_whitespace()
            .map(str::to_string)
            .collect();
    }
    let corrected: Vec<String> = tokens.iter().map(|t| correct(t)).collect();
    expand(&corrected)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── normalize ────────────────────────────────────────────────────────────

    #[test]
    fn normalize_strips_stop_words_and_lowercases() {
        let tokens = normalize("Where can I get Diesel Fuel?");
        assert_eq!(tokens, vec!["diesel".to_string(), "fuel".to_string()]);
    }

    #[test]
    fn normalize_empty_input_yields_empty() {
        assert!(normalize("").is_empty());
        assert!(normalize("   \t  ").is_empty());
    }

    #[test]
    fn normalize_drops_single_character_tokens() {
        let tokens = normalize("a b c diesel");
        assert_eq!(tokens, vec!["diesel".to_string()]);
    }

    #[test]
    fn normalize_neutralises_reserved_punctuation() {
        let tokens = normalize("\"diesel\" (fuel) [cheap], now!");
        assert_eq!(
            tokens,
            vec!["diesel".to_string(), "fuel".to_string(), "cheap".to_string(), "now".to_string()]
        );
    }

    #[test]
    fn normalize_strips_control_characters() {
        let tokens = normalize("die\u{0000}sel\u{0007} fuel");
        assert_eq!(tokens, vec!["diesel".to_string(), "fuel".to_string()]);
    }

    // ── correct ──────────────────────────────────────────────────────────────

    #[test]
    fn correct_fixes_close_typo() {
        assert_eq!(correct("dielsle"), "diesel");
        assert_eq!(correct("shwoer"), "shower");
    }

    #[test]
    fn correct_keeps_exact_vocabulary_term() {
        assert_eq!(correct("diesel"), "diesel");
        assert_eq!(correct("radio"), "radio");
    }

    #[test]
    fn correct_keeps_unrelated_token() {
        assert_eq!(correct("xyzabc123"), "xyzabc123");
        assert_eq!(correct("cb"), "cb");
    }

    #[test]
    fn correct_never_fails_on_degenerate_input() {
        assert_eq!(correct(""), "");
        assert_eq!(correct_against("diesel", &[]), "diesel");
    }

    // ── expand ───────────────────────────────────────────────────────────────

    #[test]
    fn expand_appends_intent_terms_in_order() {
        let out = expand(&["thirsty".to_string()]);
        assert_eq!(
            out,
            vec!["thirsty", "water", "drink", "beverage", "coffee", "soda"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn expand_passes_plain_tokens_through() {
        let out = expand(&["diesel".to_string(), "fuel".to_string()]);
        assert_eq!(out, vec!["diesel".to_string(), "fuel".to_string()]);
    }

    #[test]
    fn expand_dedups_preserving_first_seen_order() {
        let out = expand(&["tired".to_string(), "coffee".to_string()]);
        // "coffee" already appeared inside the "tired" expansion.
        assert_eq!(
            out,
            vec!["tired".to_string(), "energy".to_string(), "coffee".to_string(), "caffeine".to_string()]
        );
    }

    // ── search_terms ─────────────────────────────────────────────────────────

    #[test]
    fn search_terms_runs_full_pipeline() {
        let terms = search_terms("Where can I get dielsle?");
        assert_eq!(terms[0], "diesel");
    }

    #[test]
    fn search_terms_falls_back_when_only_stop_words() {
        // Every word is a stop word, so the sanitized split is used.
        let terms = search_terms("where is it");
        assert_eq!(
            terms,
            vec!["where".to_string(), "is".to_string(), "it".to_string()]
        );
    }

    #[test]
    fn search_terms_empty_input_yields_empty() {
        assert!(search_terms("").is_empty());
        assert!(search_terms("   ").is_empty());
    }
}
