//! Free-text captures: the sentences and paragraphs exported verbatim.
//!
//! Every capture has its line breaks flattened to spaces. Multi-paragraph
//! captures are joined with [`JOIN`].

use super::flags::is_lead_in;
use super::pattern::{captures_where, preceded_by_any};
use crate::model::{flatten_newlines, Paragraph};
use crate::search::{first_window, split_sentences, Trigger};
use once_cell::sync::Lazy;
use regex::Regex;

/// Separator between captured paragraphs.
pub const JOIN: &str = " / ";

/// Sentinel when no disease statement is found.
pub const DISEASE_SIGNS_NOT_FOUND: &str = "TPS pattern not found";

static COD_SENTENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bdødsårsag\w*\b").unwrap());
static VACCINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bvaccin\w*\b").unwrap());
static FOAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i) \bskumsvamp\w*\b").unwrap());
static STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)strip").unwrap());
static DISEASE_SIGNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)tegn på sygdom").unwrap());
static NO_DISEASE_SIGNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ingen tegn på sygdom").unwrap());
static KNOWN_CONDITIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)efter det oplyste.*?(?:mand|kvinde|pige|dreng)").unwrap()
});

fn joined<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    flatten_newlines(&texts.collect::<Vec<_>>().join(JOIN))
}

fn first_containing<'a>(paragraphs: &'a [Paragraph], needle: &str) -> Option<&'a Paragraph> {
    paragraphs.iter().find(|p| p.text().contains(needle))
}

/// The first sentence naming the cause of death plus the next two.
pub fn cause_of_death_text(full_text: &str) -> Option<String> {
    let sentences = split_sentences(full_text);
    first_window(&sentences, Trigger::Pattern(&COD_SENTENCE), 2, " ").map(|w| w.text)
}

/// Narrative lead-in paragraphs describing the discovery.
pub fn finding_text(paragraphs: &[Paragraph]) -> String {
    joined(paragraphs.iter().map(Paragraph::text).filter(|t| is_lead_in(t)))
}

/// Every text run mentioning vaccination.
pub fn vaccine_text(paragraphs: &[Paragraph]) -> String {
    joined(
        paragraphs
            .iter()
            .flat_map(|p| p.runs())
            .map(|r| r.text.as_str())
            .filter(|t| VACCINE.is_match(t)),
    )
}

/// Paragraphs describing foam at the airways, unless negated
/// (`ingen`, `ikke` or `eller` directly before).
pub fn foam_text(paragraphs: &[Paragraph]) -> String {
    const NEGATIONS: [&str; 3] = ["ingen", "ikke", "eller"];
    joined(paragraphs.iter().map(Paragraph::text).filter(|t| {
        !captures_where(&FOAM, t, |c| {
            let start = c.get(0).map_or(0, |m| m.start());
            !preceded_by_any(t, start, &NEGATIONS)
        })
        .is_empty()
    }))
}

/// Paragraphs mentioning a strip test.
pub fn strip_text(paragraphs: &[Paragraph]) -> String {
    joined(
        paragraphs
            .iter()
            .map(Paragraph::text)
            .filter(|t| STRIP.is_match(t)),
    )
}

/// What the first paragraph says after `tegn på sygdom`.
///
/// `ingen tegn på sygdom` yields that phrase itself.
pub fn disease_signs(paragraphs: &[Paragraph]) -> Option<String> {
    paragraphs.iter().find_map(|p| {
        let text = p.text();
        if NO_DISEASE_SIGNS.is_match(text) {
            return Some("ingen tegn på sygdom".to_string());
        }
        DISEASE_SIGNS
            .find(text)
            .map(|m| flatten_newlines(&text[m.end()..]))
    })
}

/// Known conditions: `efter det oplyste` up to the person noun.
pub fn known_conditions(paragraphs: &[Paragraph]) -> Option<String> {
    paragraphs
        .iter()
        .find_map(|p| KNOWN_CONDITIONS.find(p.text()))
        .map(|m| flatten_newlines(m.as_str()))
}

/// Description of the pericardium and heart.
///
/// Starts at the first paragraph mentioning `hjerteposen`; when that
/// paragraph does not give the colour, the first later paragraph with
/// `farven` is appended.
pub fn heart_text(paragraphs: &[Paragraph]) -> Option<String> {
    let start = paragraphs
        .iter()
        .position(|p| p.text().to_lowercase().contains("hjerteposen"))?;
    let anchor = paragraphs[start].text();
    if anchor.to_lowercase().contains("farven") {
        return Some(flatten_newlines(anchor));
    }
    let colour = paragraphs[start + 1..]
        .iter()
        .find(|p| p.text().to_lowercase().contains("farven"));
    Some(match colour {
        Some(p) => flatten_newlines(&format!("{} {}", anchor, p.text())),
        None => flatten_newlines(anchor),
    })
}

/// Description of the aorta.
pub fn aorta_text(paragraphs: &[Paragraph]) -> Option<String> {
    first_containing(paragraphs, "Legemspulsåren og").map(Paragraph::flat_text)
}

/// Description of the carotid arteries.
pub fn carotid_text(paragraphs: &[Paragraph]) -> Option<String> {
    first_containing(paragraphs, "Halspulsårerne").map(Paragraph::flat_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, TextRun};

    fn doc(paragraphs: &[&str]) -> Document {
        Document::from_paragraphs("a.docx", paragraphs.iter().copied())
    }

    #[test]
    fn test_cause_of_death_text() {
        let text = "Indledning. Dødsårsagen er drukning. Ingen vold. Påvirket af alkohol. Slut";
        assert_eq!(
            cause_of_death_text(text).as_deref(),
            Some("Dødsårsagen er drukning Ingen vold Påvirket af alkohol")
        );
        assert_eq!(cause_of_death_text("Ingen konklusion"), None);
    }

    #[test]
    fn test_finding_text() {
        let d = doc(&[
            "Af sagsakterne fremgår, at afdøde\nblev fundet.",
            "Obduktion",
            "Nu afdøde var kendt med epilepsi.",
        ]);
        assert_eq!(
            finding_text(d.paragraphs()),
            "Af sagsakterne fremgår, at afdøde blev fundet. / Nu afdøde var kendt med epilepsi."
        );
        assert_eq!(finding_text(doc(&["Obduktion"]).paragraphs()), "");
    }

    #[test]
    fn test_vaccine_text_by_run() {
        let mut d = Document::new("a.docx");
        d.push_runs(vec![
            TextRun::new("Afdøde var "),
            TextRun::new("vaccineret mod COVID-19."),
        ]);
        d.push_text("Vaccination i 2021");
        assert_eq!(
            vaccine_text(d.paragraphs()),
            "vaccineret mod COVID-19. / Vaccination i 2021"
        );
    }

    #[test]
    fn test_foam_text_skips_negated() {
        let d = doc(&[
            "Der var ingen skumsvamp.",
            "Fra munden ses skumsvamp.",
            "Ikke skumsvamp eller skumsvampe.",
        ]);
        assert_eq!(foam_text(d.paragraphs()), "Fra munden ses skumsvamp.");
    }

    #[test]
    fn test_strip_text() {
        let d = doc(&["Urinstrip negativ", "Intet", "STRIP test"]);
        assert_eq!(strip_text(d.paragraphs()), "Urinstrip negativ / STRIP test");
    }

    #[test]
    fn test_disease_signs() {
        let d = doc(&["Konklusion", "Der var tegn på sygdom i form af åreforkalkning."]);
        assert_eq!(
            disease_signs(d.paragraphs()).as_deref(),
            Some(" i form af åreforkalkning.")
        );
        let d = doc(&["Der fandtes ingen tegn på sygdom."]);
        assert_eq!(disease_signs(d.paragraphs()).as_deref(), Some("ingen tegn på sygdom"));
        assert_eq!(disease_signs(doc(&["x"]).paragraphs()), None);
    }

    #[test]
    fn test_known_conditions() {
        let d = doc(&["Efter det oplyste var afdøde en\nkendt syg mand med diabetes."]);
        assert_eq!(
            known_conditions(d.paragraphs()).as_deref(),
            Some("Efter det oplyste var afdøde en kendt syg mand")
        );
    }

    #[test]
    fn test_heart_text_continues_to_colour() {
        let d = doc(&[
            "Hjerteposen er glat.",
            "Hjertet vejer 350 g.",
            "Farven er rødbrun.",
            "Farven igen.",
        ]);
        assert_eq!(
            heart_text(d.paragraphs()).as_deref(),
            Some("Hjerteposen er glat. Farven er rødbrun.")
        );

        let d = doc(&["Hjerteposen er glat, farven normal."]);
        assert_eq!(
            heart_text(d.paragraphs()).as_deref(),
            Some("Hjerteposen er glat, farven normal.")
        );
        assert_eq!(heart_text(doc(&["Intet"]).paragraphs()), None);
    }

    #[test]
    fn test_vessel_descriptions_are_case_sensitive() {
        let d = doc(&[
            "legemspulsåren og grene",
            "Legemspulsåren og dens grene er glatte.",
            "Halspulsårerne er åbne.",
        ]);
        assert_eq!(
            aorta_text(d.paragraphs()).as_deref(),
            Some("Legemspulsåren og dens grene er glatte.")
        );
        assert_eq!(
            carotid_text(d.paragraphs()).as_deref(),
            Some("Halspulsårerne er åbne.")
        );
    }
}
