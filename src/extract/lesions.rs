//! Lesions described in the external examination.
//!
//! The section runs from the first paragraph mentioning `tegn på vold`
//! (from paragraph [`SECTION_SEARCH_START`] on) to the next paragraph
//! mentioning `Indvendig`, both excluded. Each paragraph in it that contains
//! a lesion term becomes one numbered lesion.

use super::{KeywordList, LesionLexicon};
use crate::error::Result;
use crate::model::{flatten_newlines, FieldValue, Paragraph};
use once_cell::sync::Lazy;
use regex::Regex;

/// Paragraphs before this index are never part of the lesion section.
pub const SECTION_SEARCH_START: usize = 30;

const SECTION_START: &str = "tegn på vold";
const SECTION_END: &str = "Indvendig";

static DIMENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:,\d+)?(?:\s*x\s*\d+(?:,\d+)?)?\b").unwrap());

/// One lesion paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lesion {
    /// Lesion terms found
    pub terms: Vec<String>,
    /// Location terms found
    pub locations: Vec<String>,
    /// Colour terms found
    pub colors: Vec<String>,
    /// Shape terms found
    pub shapes: Vec<String>,
    /// Sizes written after a lesion term, first occurrence order
    pub dimensions: Vec<String>,
}

/// Term matched by its stem: the term without its last character,
/// followed by any word characters.
#[derive(Debug, Clone)]
struct StemTerm {
    term: String,
    pattern: Regex,
}

fn stems(list: &KeywordList) -> Result<Vec<StemTerm>> {
    let mut compiled = Vec::with_capacity(list.len());
    for term in list.terms() {
        let mut stem = term.clone();
        stem.pop();
        if stem.is_empty() {
            log::warn!("Ignoring one-character lesion term {:?}", term);
            continue;
        }
        compiled.push(StemTerm {
            term: term.clone(),
            pattern: Regex::new(&format!(r"(?i)\b{}\w*\b", regex::escape(&stem)))?,
        });
    }
    Ok(compiled)
}

fn matching(terms: &[StemTerm], text: &str) -> Vec<String> {
    terms
        .iter()
        .filter(|t| t.pattern.is_match(text))
        .map(|t| t.term.clone())
        .collect()
}

/// Lesion extraction compiled from a [`LesionLexicon`].
#[derive(Debug, Clone)]
pub struct LesionMatcher {
    lesions: Vec<String>,
    locations: Vec<StemTerm>,
    colors: Vec<StemTerm>,
    shapes: Vec<StemTerm>,
}

impl LesionMatcher {
    /// Compile the stem patterns of the lexicon.
    pub fn new(lexicon: &LesionLexicon) -> Result<Self> {
        Ok(Self {
            lesions: lexicon.lesions.terms().to_vec(),
            locations: stems(&lexicon.locations)?,
            colors: stems(&lexicon.colors)?,
            shapes: stems(&lexicon.shapes)?,
        })
    }

    /// Lesions in document order.
    pub fn extract(&self, paragraphs: &[Paragraph]) -> Vec<Lesion> {
        section(paragraphs)
            .iter()
            .filter_map(|p| self.lesion(p.text()))
            .collect()
    }

    fn lesion(&self, text: &str) -> Option<Lesion> {
        let terms: Vec<String> = self
            .lesions
            .iter()
            .filter(|term| text.contains(term.as_str()))
            .cloned()
            .collect();
        if terms.is_empty() {
            return None;
        }

        let mut dimensions: Vec<String> = Vec::new();
        for term in &terms {
            let Some(at) = text.find(term.as_str()) else {
                continue;
            };
            for m in DIMENSION.find_iter(&text[at + term.len()..]) {
                if !dimensions.iter().any(|d| d == m.as_str()) {
                    dimensions.push(m.as_str().to_string());
                }
            }
        }

        Some(Lesion {
            locations: matching(&self.locations, text),
            colors: matching(&self.colors, text),
            shapes: matching(&self.shapes, text),
            terms,
            dimensions,
        })
    }
}

/// Paragraphs between the violence heading and the internal examination.
pub fn section(paragraphs: &[Paragraph]) -> &[Paragraph] {
    let tail = paragraphs.get(SECTION_SEARCH_START..).unwrap_or(&[]);
    let Some(start) = tail.iter().position(|p| p.text().contains(SECTION_START)) else {
        return &[];
    };
    let Some(len) = tail[start + 1..]
        .iter()
        .position(|p| p.text().contains(SECTION_END))
    else {
        return &[];
    };
    &tail[start + 1..start + 1 + len]
}

/// Export fields for a list of lesions: `lesion_N`, `lesion_N_loc`,
/// `lesion_N_col`, `lesion_N_sha`, `lesion_N_dim` (only when non-empty)
/// and `lesion_count`.
pub fn fields(lesions: &[Lesion]) -> Vec<(String, FieldValue)> {
    let mut out = Vec::new();
    for (i, lesion) in lesions.iter().enumerate() {
        let n = i + 1;
        let parts = [
            (format!("lesion_{}", n), &lesion.terms),
            (format!("lesion_{}_loc", n), &lesion.locations),
            (format!("lesion_{}_col", n), &lesion.colors),
            (format!("lesion_{}_sha", n), &lesion.shapes),
            (format!("lesion_{}_dim", n), &lesion.dimensions),
        ];
        for (name, values) in parts {
            if !values.is_empty() {
                out.push((name, FieldValue::Text(flatten_newlines(&values.join(" / ")))));
            }
        }
    }
    out.push((
        crate::model::fields::LESION_COUNT.to_string(),
        FieldValue::Int(lesions.len() as i64),
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;

    fn lexicon() -> LesionLexicon {
        LesionLexicon {
            lesions: KeywordList::new(["hudafskrabning", "blodunderløben"]),
            colors: KeywordList::new(["rødlig", "blålig"]),
            locations: KeywordList::new(["skulder", "knæ"]),
            shapes: KeywordList::new(["afrundet"]),
        }
    }

    fn report(section: &[&str]) -> Document {
        let mut paragraphs = vec!["indledning"; SECTION_SEARCH_START];
        paragraphs.push("Der er tegn på vold:");
        paragraphs.extend_from_slice(section);
        paragraphs.push("Indvendig undersøgelse");
        paragraphs.push("hudafskrabning efter sektionen");
        Document::from_paragraphs("a.docx", paragraphs)
    }

    #[test]
    fn test_lesions_in_section() {
        let doc = report(&[
            "På højre skulder en rødlige afrundede hudafskrabning 2 x 3 cm og 2 x 3 cm.",
            "Ingen fund.",
            "På venstre knæ en blodunderløben 4,5 cm.",
        ]);
        let matcher = LesionMatcher::new(&lexicon()).unwrap();
        let lesions = matcher.extract(doc.paragraphs());
        assert_eq!(lesions.len(), 2);
        assert_eq!(lesions[0].terms, ["hudafskrabning"]);
        assert_eq!(lesions[0].locations, ["skulder"]);
        assert_eq!(lesions[0].colors, ["rødlig"]);
        assert_eq!(lesions[0].shapes, ["afrundet"]);
        assert_eq!(lesions[0].dimensions, ["2 x 3"]);
        assert_eq!(lesions[1].dimensions, ["4,5"]);

        let out = fields(&lesions);
        assert_eq!(out[0], ("lesion_1".to_string(), FieldValue::Text("hudafskrabning".into())));
        assert_eq!(
            out.last().unwrap(),
            &("lesion_count".to_string(), FieldValue::Int(2))
        );
        assert!(!out.iter().any(|(n, _)| n == "lesion_2_col"));
    }

    #[test]
    fn test_no_section_means_zero_lesions() {
        let doc = Document::from_paragraphs("a.docx", ["tegn på vold", "hudafskrabning", "Indvendig"]);
        let matcher = LesionMatcher::new(&lexicon()).unwrap();
        let lesions = matcher.extract(doc.paragraphs());
        assert!(lesions.is_empty());
        assert_eq!(
            fields(&lesions),
            [("lesion_count".to_string(), FieldValue::Int(0))]
        );
    }

    #[test]
    fn test_section_needs_end_marker() {
        let mut paragraphs = vec!["x"; SECTION_SEARCH_START];
        paragraphs.push("tegn på vold");
        paragraphs.push("hudafskrabning");
        let doc = Document::from_paragraphs("a.docx", paragraphs);
        assert!(section(doc.paragraphs()).is_empty());
    }
}
