//! Putrefaction sentences and severity.
//!
//! Only part of a report describes the body's state: the introduction up to
//! the first `foreligger`, the external examination, and the closing
//! sentences. [`scope`] selects those sentences; the extractors then look
//! at the ones that mention putrefaction.

use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing sentences always in scope.
const CLOSING_SENTENCES: usize = 4;

/// Severity of putrefaction, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Only insect activity described
    InsectOnly,
    /// Putrefaction explicitly absent
    NotPresent,
    /// Early or slight putrefaction
    Discreet,
    /// Moderate putrefaction
    Moderate,
    /// Advanced putrefaction
    Pronounced,
}

impl Severity {
    /// Export label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::InsectOnly => "INSECT ONLY",
            Severity::NotPresent => "NONE",
            Severity::Discreet => "DISCREET",
            Severity::Moderate => "MODERATE",
            Severity::Pronounced => "PRONOUNCED",
        }
    }
}

/// Outcome of severity classification for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degree {
    /// No sentence in scope mentions putrefaction
    NoMention,
    /// Putrefaction is mentioned but no level phrase was recognised
    NoMatch,
    /// The most severe level found
    Level(Severity),
}

impl Degree {
    /// Export label.
    pub fn label(&self) -> &'static str {
        match self {
            Degree::NoMention => "NO MENTION",
            Degree::NoMatch => "NO MATCH",
            Degree::Level(severity) => severity.label(),
        }
    }
}

/// Level phrases, tested most severe first; the first hit classifies a
/// sentence.
static LEVELS: Lazy<Vec<(Severity, Regex)>> = Lazy::new(|| {
    [
        (
            Severity::Pronounced,
            r"(?i)\bsvær?e\b|\budtalt(?:e)?\b|\bfremskreden\b",
        ),
        (
            Severity::Moderate,
            r"(?i)\bmoderate?\b|\bmiddelsvær\b|\b(?:hud)?afløsning\b",
        ),
        (
            Severity::Discreet,
            r"(?i)\bgrøn(?:lig )?(?:mis)?farvning\b|\blet?t?e\b|\bkartegning\b|\bbegyndende\b",
        ),
        (Severity::NotPresent, r"(?i)\bingen\b|\bikke\b"),
        (Severity::InsectOnly, r"(?i)insektangreb|maddike"),
    ]
    .into_iter()
    .map(|(severity, pattern)| (severity, Regex::new(pattern).unwrap()))
    .collect()
});

fn position_ci(sentences: &[&str], needle: &str) -> Option<usize> {
    sentences
        .iter()
        .position(|s| s.to_lowercase().contains(needle))
}

/// Sentences (split at `.`, `!`, `?`) that may describe putrefaction, in
/// document order, each at most once.
pub fn scope(text: &str) -> Vec<&str> {
    let sentences: Vec<&str> = text.split(['.', '!', '?']).collect();
    let mut selected = vec![false; sentences.len()];

    if let Some(end) = position_ci(&sentences, "foreligger") {
        selected[..=end].iter_mut().for_each(|s| *s = true);
    }

    let external = position_ci(&sentences, "udvendig undersøgelse");
    let internal = position_ci(&sentences, "indvendig undersøgelse");
    if let (Some(start), Some(end)) = (external, internal) {
        if start + 1 < end {
            selected[start + 1..end].iter_mut().for_each(|s| *s = true);
        }
    }

    let closing = sentences.len().saturating_sub(CLOSING_SENTENCES);
    selected[closing..].iter_mut().for_each(|s| *s = true);

    sentences
        .into_iter()
        .zip(selected)
        .filter_map(|(s, keep)| keep.then_some(s))
        .collect()
}

/// Most severe putrefaction level described.
pub fn degree(text: &str) -> Degree {
    let relevant: Vec<&str> = scope(text)
        .into_iter()
        .map(str::trim)
        .filter(|s| {
            let lower = s.to_lowercase();
            lower.contains("forrådnelse") || lower.contains("grønlig")
        })
        .collect();
    if relevant.is_empty() {
        return Degree::NoMention;
    }

    relevant
        .iter()
        .filter_map(|sentence| {
            LEVELS
                .iter()
                .find(|(_, re)| re.is_match(sentence))
                .map(|(severity, _)| *severity)
        })
        .max()
        .map_or(Degree::NoMatch, Degree::Level)
}

/// Putrefaction sentences joined with ` / `, if any.
pub fn sentences(text: &str) -> Option<String> {
    let found: Vec<&str> = scope(text)
        .into_iter()
        .map(str::trim)
        .filter(|s| {
            let lower = s.to_lowercase();
            lower.contains("forrådnelse") || lower.contains("grønlig misfarvning")
        })
        .collect();
    if found.is_empty() {
        None
    } else {
        Some(found.join(" / "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_mention() {
        assert_eq!(degree("Afdøde blev fundet i sin seng. Intet bemærkelsesværdigt."), Degree::NoMention);
        assert_eq!(degree("").label(), "NO MENTION");
    }

    #[test]
    fn test_discreet_beats_none() {
        let text = "Der var ingen forrådnelse på ryggen. Der var begyndende forrådnelse på maven.";
        assert_eq!(degree(text), Degree::Level(Severity::Discreet));
    }

    #[test]
    fn test_pronounced() {
        let text = "Liget udviste udtalt forrådnelse.";
        assert_eq!(degree(text).label(), "PRONOUNCED");
    }

    #[test]
    fn test_no_match() {
        assert_eq!(degree("Forrådnelse blev beskrevet.").label(), "NO MATCH");
    }

    #[test]
    fn test_first_level_classifies_sentence() {
        // "ikke" would read NONE, but the moderate phrase is tested first
        let text = "Der var moderat forrådnelse, ikke på hænderne.";
        assert_eq!(degree(text), Degree::Level(Severity::Moderate));
    }

    #[test]
    fn test_scope_skips_internal_examination() {
        let mut text = String::from("Rapport foreligger. Udvendig undersøgelse. Grønlig misfarvning af huden. Indvendig undersøgelse. ");
        text.push_str("Udtalt forrådnelse af organerne. ");
        text.push_str("a. b. c. d. e.");
        assert_eq!(degree(&text), Degree::Level(Severity::Discreet));
        assert_eq!(sentences(&text).as_deref(), Some("Grønlig misfarvning af huden"));
    }

    #[test]
    fn test_closing_sentences_in_scope() {
        let text = "Konklusion. Der var svær forrådnelse";
        assert_eq!(degree(text), Degree::NoMatch);
        let text = "Konklusion. Der var svære forrådnelsesforandringer";
        assert_eq!(degree(text), Degree::Level(Severity::Pronounced));
    }

    #[test]
    fn test_sentences_none() {
        assert_eq!(sentences("Ingen bemærkninger."), None);
    }
}
