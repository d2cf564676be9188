//! Regex helpers shared by the extractors.
//!
//! The `regex` crate has no lookaround. Patterns that need it are split into
//! a plain match plus a predicate on the surrounding text, and the scan is
//! resumed one character after a rejected candidate, the way a backtracking
//! engine moves on after a failed assertion.

use super::Malformed;
use regex::{Captures, Regex};

/// Every match of `re` accepted by `accept`, left to right.
pub fn captures_where<'h>(
    re: &Regex,
    haystack: &'h str,
    mut accept: impl FnMut(&Captures<'h>) -> bool,
) -> Vec<Captures<'h>> {
    let mut found = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        let Some(caps) = re.captures_at(haystack, start) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        let (match_start, match_end) = (whole.start(), whole.end());
        if accept(&caps) {
            found.push(caps);
            start = if match_end > match_start {
                match_end
            } else {
                next_char_boundary(haystack, match_end)
            };
        } else {
            start = next_char_boundary(haystack, match_start);
        }
    }
    found
}

/// First match of `re` accepted by `accept`.
pub fn first_where<'h>(
    re: &Regex,
    haystack: &'h str,
    mut accept: impl FnMut(&Captures<'h>) -> bool,
) -> Option<Captures<'h>> {
    let mut start = 0;
    while start <= haystack.len() {
        let caps = re.captures_at(haystack, start)?;
        let whole = caps.get(0)?;
        if accept(&caps) {
            return Some(caps);
        }
        start = next_char_boundary(haystack, whole.start());
    }
    None
}

fn next_char_boundary(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map(|c| at + c.len_utf8())
        .unwrap_or(text.len() + 1)
}

/// Text from `at` up to (not including) the next `.`.
pub fn sentence_rest(text: &str, at: usize) -> &str {
    let rest = &text[at..];
    match rest.find('.') {
        Some(dot) => &rest[..dot],
        None => rest,
    }
}

/// True if `re` matches in the rest of the sentence starting at `at`,
/// at least `gap` characters after it.
pub fn followed_in_sentence(text: &str, at: usize, re: &Regex, gap: usize) -> bool {
    let rest = sentence_rest(text, at);
    let skip = rest
        .char_indices()
        .nth(gap)
        .map(|(i, _)| i)
        .unwrap_or(rest.len() + 1);
    skip <= rest.len() && re.is_match_at(rest, skip)
}

/// True if the text before `at` ends with one of `words`, ignoring case.
pub fn preceded_by_any(text: &str, at: usize, words: &[&str]) -> bool {
    let before = text[..at].to_lowercase();
    words.iter().any(|w| before.ends_with(w))
}

/// The text from the `n`th character on (empty when shorter).
pub fn skip_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((i, _)) => &text[i..],
        None => "",
    }
}

/// Escaped alternation of keywords, for use inside a group.
pub fn alternation<S: AsRef<str>>(keywords: &[S]) -> String {
    keywords
        .iter()
        .map(|k| regex::escape(k.as_ref()))
        .collect::<Vec<_>>()
        .join("|")
}

/// Case-insensitive substring test.
pub fn contains_ci(text: &str, needle: &str) -> bool {
    text.to_lowercase().contains(&needle.to_lowercase())
}

/// Parse an integer capture.
pub fn parse_int(input: &str) -> Result<i64, Malformed> {
    input
        .parse::<i64>()
        .map_err(|e| Malformed::new(input, e.to_string()))
}

/// Parse a decimal capture; a decimal comma is accepted.
pub fn parse_decimal(input: &str) -> Result<f64, Malformed> {
    input
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|e| Malformed::new(input, e.to_string()))
}

/// Parse a decimal capture and round half to even.
pub fn parse_rounded(input: &str) -> Result<i64, Malformed> {
    let value = parse_decimal(input)?.round_ties_even();
    if value.is_finite() && value.abs() < i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(Malformed::new(input, "value out of range"))
    }
}
