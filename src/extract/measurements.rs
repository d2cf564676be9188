//! Numeric measurements: organ weights and sizes, wall thickness, fluid
//! volumes, body height and weight.
//!
//! Keyword-driven extractors are compiled once from their keyword list and
//! then applied to every document. Organ weights, sizes, wall thickness and
//! fluid volumes only look at the internal examination, see
//! [`internal_region`]. Body height and weight are read from the whole text.

use super::pattern::{
    alternation, captures_where, parse_decimal, parse_int, parse_rounded, sentence_rest,
    skip_chars,
};
use super::{Diagnostics, Malformed};
use crate::error::Result;
use crate::model::fields;
use crate::search::split_sentences;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Heading that starts the internal examination.
pub const INTERNAL_EXAMINATION: &str = "Indvendig undersøgelse";

/// Character offset used when the heading is missing.
pub const FALLBACK_OFFSET: usize = 2500;

static WEIGHT_EXCLUSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)blodans|bris|væskeans|hjertepose").unwrap());
static CLAUSE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.\s*|\s+og\s+|,").unwrap());

static HEIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Højde(?:n)?(?: er)? (\d+)\s(cm)").unwrap());
static WEIGHT_KG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)vægt(?:en)?(?: er)?\s((?:\d+,)?\d+)\s?(kg|kilo)(?:\.|,|\s)").unwrap()
});
static WEIGHT_G: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)vægt(?:en)?(?: er)?.*?(\d+)\s?g(?:ram)?(?:\.|,|\s)").unwrap()
});

/// The internal examination: from the heading on, or from
/// [`FALLBACK_OFFSET`] characters when the heading is missing.
pub fn internal_region(text: &str) -> &str {
    match text.find(INTERNAL_EXAMINATION) {
        Some(start) => &text[start..],
        None => skip_chars(text, FALLBACK_OFFSET),
    }
}

fn keyword_pattern<S: AsRef<str>>(keywords: &[S], template: &str) -> Result<Option<Regex>> {
    if keywords.is_empty() {
        return Ok(None);
    }
    let pattern = template.replace("{kw}", &alternation(keywords));
    Ok(Some(Regex::new(&pattern)?))
}

/// Organ weights in grams.
#[derive(Debug, Clone)]
pub struct OrganWeights {
    pattern: Option<Regex>,
}

impl OrganWeights {
    /// Compile the matcher for the given organ keywords.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        Ok(Self {
            pattern: keyword_pattern(
                keywords,
                r"(?i)({kw})[^.]*?(?:ca\.)?[^.]*?(\d{2,4})\s*(?:gram|g)",
            )?,
        })
    }

    /// First weight per organ in `region`, keyed by the lower-cased keyword.
    ///
    /// A candidate is skipped when the rest of its sentence mentions a
    /// haemorrhage, rupture, effusion or the pericardium.
    pub fn extract(&self, region: &str, diagnostics: &mut Diagnostics) -> Vec<(String, i64)> {
        let Some(re) = &self.pattern else {
            return Vec::new();
        };
        let accepted = captures_where(re, region, |c| {
            let after_keyword = c.get(1).map_or(0, |m| m.end());
            !WEIGHT_EXCLUSION.is_match(sentence_rest(region, after_keyword))
        });

        let mut weights: Vec<(String, i64)> = Vec::new();
        for caps in accepted {
            let key = caps[1].to_lowercase();
            if weights.iter().any(|(k, _)| *k == key) {
                continue;
            }
            if let Some(grams) = diagnostics.check(&key, parse_int(&caps[2])) {
                weights.push((key, grams));
            }
        }
        weights
    }
}

/// Three-dimensional organ sizes in cm.
#[derive(Debug, Clone)]
pub struct OrganSizes {
    keywords: Vec<String>,
    pattern: Option<Regex>,
}

/// Height, width and depth of one organ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    /// First dimension
    pub height: f64,
    /// Second dimension
    pub width: f64,
    /// Third dimension
    pub depth: f64,
}

impl OrganSizes {
    /// Compile the matcher for the given organ keywords.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        Ok(Self {
            keywords: keywords.iter().map(|k| k.as_ref().to_string()).collect(),
            pattern: keyword_pattern(
                keywords,
                r"(?i)({kw})[^.]*?måler (\d+(?:[.,]\d+)?) x (\d+(?:[.,]\d+)?) x (\d+(?:[.,]\d+)?) cm",
            )?,
        })
    }

    /// Sizes per organ in `region`, keyed by the configured keyword.
    /// A later measurement of the same organ replaces an earlier one.
    pub fn extract(&self, region: &str, diagnostics: &mut Diagnostics) -> Vec<(String, Dimensions)> {
        let Some(re) = &self.pattern else {
            return Vec::new();
        };
        let mut sizes: Vec<(String, Dimensions)> = Vec::new();
        for caps in re.captures_iter(region) {
            let organ = self.canonical(&caps[1]);
            let field = format!("{}_højde", organ);
            let Some(dims) = diagnostics.check(&field, dimensions(&caps)) else {
                continue;
            };
            match sizes.iter_mut().find(|(k, _)| *k == organ) {
                Some(slot) => slot.1 = dims,
                None => sizes.push((organ, dims)),
            }
        }
        sizes
    }

    fn canonical(&self, matched: &str) -> String {
        let lower = matched.to_lowercase();
        self.keywords
            .iter()
            .find(|k| k.to_lowercase() == lower)
            .cloned()
            .unwrap_or_else(|| matched.to_string())
    }
}

fn dimensions(caps: &Captures<'_>) -> std::result::Result<Dimensions, Malformed> {
    Ok(Dimensions {
        height: parse_decimal(&caps[2])?,
        width: parse_decimal(&caps[3])?,
        depth: parse_decimal(&caps[4])?,
    })
}

/// Heart wall thickness in mm.
#[derive(Debug, Clone)]
pub struct WallThickness {
    pattern: Option<Regex>,
}

impl WallThickness {
    /// Compile the matcher for the given wall keywords.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        Ok(Self {
            pattern: keyword_pattern(keywords, r"(?i)({kw}).*?(\d{1,2}) mm")?,
        })
    }

    /// First thickness per wall, sentence by sentence over `region`.
    pub fn extract(&self, region: &str, diagnostics: &mut Diagnostics) -> Vec<(String, i64)> {
        let Some(re) = &self.pattern else {
            return Vec::new();
        };
        let mut thickness: Vec<(String, i64)> = Vec::new();
        for sentence in split_sentences(region) {
            for caps in re.captures_iter(sentence) {
                let key = caps[1].to_lowercase();
                if thickness.iter().any(|(k, _)| *k == key) {
                    continue;
                }
                if let Some(mm) = diagnostics.check(&key, parse_int(&caps[2])) {
                    thickness.push((key, mm));
                }
            }
        }
        thickness
    }
}

/// Fluid volumes in ml per cavity.
#[derive(Debug, Clone)]
pub struct FluidVolumes {
    keywords: Vec<String>,
    pattern: Option<Regex>,
}

impl FluidVolumes {
    /// Compile the matcher for the given cavity keywords.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        Ok(Self {
            keywords: keywords.iter().map(|k| k.as_ref().to_lowercase()).collect(),
            pattern: keyword_pattern(
                keywords,
                r"(?i)(\d{1,4}) ml.*?({kw})|({kw}).*?(\d{1,4}) ml",
            )?,
        })
    }

    /// One entry per configured cavity, in keyword order; `None` when the
    /// cavity is never mentioned with a volume in `region`. The last mention
    /// wins.
    pub fn extract(&self, region: &str, diagnostics: &mut Diagnostics) -> Vec<(String, Option<i64>)> {
        let mut volumes: Vec<(String, Option<i64>)> =
            self.keywords.iter().map(|k| (k.clone(), None)).collect();
        let Some(re) = &self.pattern else {
            return volumes;
        };
        for clause in CLAUSE_BREAK.split(region) {
            for caps in re.captures_iter(clause) {
                let (volume, keyword) = match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
                    (Some(v), Some(k), _, _) => (v.as_str(), k.as_str()),
                    (_, _, Some(k), Some(v)) => (v.as_str(), k.as_str()),
                    _ => continue,
                };
                let key = keyword.to_lowercase();
                let Some(slot) = volumes.iter_mut().find(|(k, _)| *k == key) else {
                    continue;
                };
                if let Some(ml) = diagnostics.check(&key, parse_int(volume)) {
                    slot.1 = Some(ml);
                }
            }
        }
        volumes
    }
}

/// Body height and weight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyMeasurements {
    /// Height in cm
    pub height_cm: Option<i64>,
    /// Weight in `weight_unit`
    pub weight: Option<i64>,
    /// `kg` or `g`
    pub weight_unit: Option<&'static str>,
}

/// Body height and weight from the external examination.
///
/// Decimal kilograms (`72,5 kg`) are rounded half to even; a gram weight is
/// only used when no kilogram weight is given.
pub fn body_measurements(text: &str, diagnostics: &mut Diagnostics) -> BodyMeasurements {
    let mut body = BodyMeasurements::default();

    if let Some(c) = HEIGHT.captures(text) {
        body.height_cm = diagnostics.check(fields::HEIGHT, parse_int(&c[1]));
    }

    if let Some(c) = WEIGHT_KG.captures(text) {
        let value = &c[1];
        let parsed = if value.contains(',') {
            parse_rounded(value)
        } else {
            parse_int(value)
        };
        body.weight = diagnostics.check(fields::BODY_WEIGHT, parsed);
        body.weight_unit = Some("kg");
    } else if let Some(c) = WEIGHT_G.captures(text) {
        body.weight = diagnostics.check(fields::BODY_WEIGHT, parse_int(&c[1]));
        body.weight_unit = Some("g");
    }

    body
}
