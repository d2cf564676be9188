//! Contextual window search over paragraph or sentence sequences.
//!
//! A [`Trigger`] picks the items of interest; a window is the trigger item
//! plus up to `following` items after it, joined by a caller supplied
//! separator. Nothing here fails: no match simply yields no window.

use regex::Regex;

/// Predicate selecting trigger items.
#[derive(Debug, Clone, Copy)]
pub enum Trigger<'a> {
    /// Case-insensitive substring.
    Substring(&'a str),
    /// Case-sensitive substring.
    Exact(&'a str),
    /// Regular expression; case sensitivity is up to the pattern.
    Pattern(&'a Regex),
}

impl Trigger<'_> {
    /// Check if an item satisfies the trigger.
    pub fn matches(&self, item: &str) -> bool {
        match self {
            Trigger::Substring(needle) => item.to_lowercase().contains(&needle.to_lowercase()),
            Trigger::Exact(needle) => item.contains(needle),
            Trigger::Pattern(re) => re.is_match(item),
        }
    }
}

/// A trigger item and the items joined after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Index of the trigger item
    pub start: usize,
    /// One past the last item included
    pub end: usize,
    /// Joined text of `items[start..end]`
    pub text: String,
}

impl Window {
    /// Number of items in the window.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Windows always hold at least the trigger item.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Index of every item satisfying the trigger.
pub fn find_all<'s, S: AsRef<str>>(
    items: &'s [S],
    trigger: Trigger<'s>,
) -> impl Iterator<Item = usize> + 's {
    items
        .iter()
        .enumerate()
        .filter(move |(_, item)| trigger.matches(item.as_ref()))
        .map(|(i, _)| i)
}

/// Index of the first item satisfying the trigger.
pub fn find_first<S: AsRef<str>>(items: &[S], trigger: Trigger<'_>) -> Option<usize> {
    items.iter().position(|item| trigger.matches(item.as_ref()))
}

/// Build the window starting at `start`.
pub fn window_at<S: AsRef<str>>(items: &[S], start: usize, following: usize, sep: &str) -> Window {
    let end = (start + 1 + following).min(items.len());
    let text = items[start..end]
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(sep);
    Window { start, end, text }
}

/// Window around the first trigger item.
pub fn first_window<S: AsRef<str>>(
    items: &[S],
    trigger: Trigger<'_>,
    following: usize,
    sep: &str,
) -> Option<Window> {
    find_first(items, trigger).map(|start| window_at(items, start, following, sep))
}

/// One window per trigger item, in document order. Windows may overlap.
pub fn all_windows<S: AsRef<str>>(
    items: &[S],
    trigger: Trigger<'_>,
    following: usize,
    sep: &str,
) -> Vec<Window> {
    let starts: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| trigger.matches(item.as_ref()))
        .map(|(i, _)| i)
        .collect();
    starts
        .into_iter()
        .map(|start| window_at(items, start, following, sep))
        .collect()
}

/// Split text into sentences at `.` followed by optional whitespace.
pub fn split_sentences(text: &str) -> Vec<&str> {
    use once_cell::sync::Lazy;
    static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\s*").unwrap());
    SENTENCE_BREAK.split(text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<&'static str> {
        vec![
            "Konklusion",
            "Dødsårsagen er drukning",
            "Der er ikke fundet tegn på vold",
            "Afdøde var påvirket",
            "Slut",
        ]
    }

    #[test]
    fn test_first_window_substring() {
        let w = first_window(&items(), Trigger::Substring("DØDSÅRSAG"), 2, " ").unwrap();
        assert_eq!(w.start, 1);
        assert_eq!(w.end, 4);
        assert_eq!(
            w.text,
            "Dødsårsagen er drukning Der er ikke fundet tegn på vold Afdøde var påvirket"
        );
    }

    #[test]
    fn test_window_clamped_at_end() {
        let w = first_window(&items(), Trigger::Exact("Slut"), 2, " / ").unwrap();
        assert_eq!(w.len(), 1);
        assert_eq!(w.text, "Slut");
    }

    #[test]
    fn test_no_match_yields_none() {
        assert!(first_window(&items(), Trigger::Substring("hængning"), 2, " ").is_none());
        assert!(all_windows(&items(), Trigger::Substring("hængning"), 2, " ").is_empty());
    }

    #[test]
    fn test_pattern_trigger_and_all_windows() {
        let re = Regex::new(r"(?i)\bvold\b|\bslut\b").unwrap();
        let windows = all_windows(&items(), Trigger::Pattern(&re), 0, " ");
        let starts: Vec<usize> = windows.iter().map(|w| w.start).collect();
        assert_eq!(starts, [2, 4]);
        assert_eq!(windows[0].text, "Der er ikke fundet tegn på vold");
    }

    #[test]
    fn test_exact_is_case_sensitive() {
        assert!(!Trigger::Exact("slut").matches("Slut"));
        assert!(Trigger::Substring("slut").matches("Slut"));
    }

    #[test]
    fn test_find_all() {
        let found: Vec<usize> = find_all(&items(), Trigger::Substring("er")).collect();
        assert_eq!(found, [1, 2]);
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("Første. Anden.  Tredje"),
            ["Første", "Anden", "Tredje"]
        );
    }
}
