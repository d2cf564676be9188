//! Boolean keyword flags: cause of death, discovery circumstances, CT
//! findings and autoerotic death.

use super::pattern::{contains_ci, first_where, followed_in_sentence};
use crate::error::Result;
use crate::model::Paragraph;
use crate::search::{all_windows, find_all, split_sentences, Trigger};
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentences after a cause-of-death sentence that belong to its context.
const COD_CONTEXT: usize = 2;

/// Paragraphs after a CT paragraph searched for the CT keyword.
const CT_FOLLOWING: usize = 3;

/// A labelled pattern, optionally vetoed by a term later in the sentence.
#[derive(Debug)]
pub struct Rule {
    /// Export field name
    pub label: &'static str,
    pattern: Regex,
    unless_followed_by: Option<Regex>,
}

impl Rule {
    fn new(label: &'static str, pattern: &str) -> Self {
        Self {
            label,
            pattern: Regex::new(&format!("(?i){}", pattern)).unwrap(),
            unless_followed_by: None,
        }
    }

    fn unless_followed_by(mut self, veto: &str) -> Self {
        self.unless_followed_by = Some(Regex::new(&format!("(?i){}", veto)).unwrap());
        self
    }

    /// Check if the rule fires anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        match &self.unless_followed_by {
            None => self.pattern.is_match(text),
            Some(veto) => first_where(&self.pattern, text, |c| {
                let end = c.get(0).map_or(0, |m| m.end());
                !followed_in_sentence(text, end, veto, 1)
            })
            .is_some(),
        }
    }
}

static COD_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("uoplyst", "ikke oplyst|uoplyst"),
        Rule::new("drukning", "drukning"),
        Rule::new("hjertesvigt", "akut hjertesvigt"),
        Rule::new("forgiftning", "forgiftning").unless_followed_by("kulilte|cyanid"),
        Rule::new("hængning", "hængning"),
        Rule::new("skud", "skudlæsion"),
        Rule::new("stik_snit", "stiklæsion|snitlæsion|stiksår|snitsår"),
        Rule::new("forblødning", "forblødning"),
        Rule::new("forbrænding", "forbrænding"),
        Rule::new(
            "lungebetændelse",
            "lunge[^.]+betændelse|betændelse[^.]+lunge|lungebetændelse",
        ),
        Rule::new("ikke holdepunkt", "ikke holdepunkt"),
        Rule::new(
            "supp_no_change",
            "resultat[^.]+giver ikke|resultat[^.]+ændrer ikke",
        ),
    ]
});

/// Cause-of-death flags in export order.
///
/// Every sentence mentioning `dødsårsag` opens a window with the two
/// sentences after it; a flag is set if its rule fires in any window.
pub fn cause_of_death(full_text: &str) -> Vec<(&'static str, bool)> {
    let sentences = split_sentences(full_text);
    let windows = all_windows(&sentences, Trigger::Substring("dødsårsag"), COD_CONTEXT, " ");
    COD_RULES
        .iter()
        .map(|rule| (rule.label, windows.iter().any(|w| rule.is_match(&w.text))))
        .collect()
}

/// Openings of the paragraphs that narrate how the deceased was found.
pub const LEAD_INS: &[&str] = &[
    "af sagsakterne fremgår",
    "af disse papirer",
    "nu afdøde",
    "der foreligger rapport fra",
    "om hændelsesforløbet",
    "det fremgår af det foreliggende",
    "det fremgår",
    "af det foreliggende fremgår",
];

/// Check if a paragraph opens with one of the [`LEAD_INS`].
pub fn is_lead_in(text: &str) -> bool {
    let lower = text.to_lowercase();
    LEAD_INS.iter().any(|p| lower.starts_with(p))
}

/// Field name of the found-in-water flag.
pub const FOUND_IN_WATER: &str = "fundet_i_vand";
/// Field name of the traffic flag.
pub const TRAFFIC: &str = "trafik";

static TRAFFIC_RULE: Lazy<Rule> = Lazy::new(|| {
    Rule::new(
        TRAFFIC,
        r"påkørt|fører af|passager\b|færdselsuheld|trafikuheld|trafikulykke",
    )
});

static WATER_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)fundet|livløs|\bfandt|liggende|ligget|lå|nedsunket|under|\bflydende\b|drivende|bunden|ude i vandet|fik i|trukket op|optaget i|spottet|bjerget|fisket op|reddet",
    )
    .unwrap()
});

static WATER_PLACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\bflydende|druknet|drivende|i vandet|af vandet|i en å|\bå\b|\bbrønd\b|sivbrønd",
        r"|sivområde|trawl|under vand|lavt vand|swimmingpool|vandkanten|vandoverfladen|vandhul",
        r"|fra båden|bælt\b|vandløb|dam\b|fiskedam|\bsø\b|søen\b|gadekær|på bunden|havbunden",
        r"|saltvandsbassin|havnebassin|drevet i land|bundgarn|farvand|fjord|voldgrav",
        r"|strandkanten|havet\b|havstokken|\bkanal|\bhavn",
    ))
    .unwrap()
});

/// Punctuation followed by whitespace, or a line break, ends a clause.
static CLAUSE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,:]\s|\n").unwrap());

/// A finding verb followed, later in the same clause, by a body of water.
fn found_in_water(text: &str) -> bool {
    CLAUSE_BREAK.split(text).any(|clause| {
        WATER_CONTEXT.find_iter(clause).any(|context| {
            let Some((gap, _)) = clause[context.end()..].char_indices().nth(1) else {
                return false;
            };
            let from = context.end() + gap;
            first_where(&WATER_PLACE, clause, |c| {
                let m = c.get(0).map_or(0..0, |m| m.range());
                // "havnet" is a verb form, not a harbour
                let verb = clause[m.clone()].eq_ignore_ascii_case("havn")
                    && clause
                        .get(m.end..m.end + 2)
                        .is_some_and(|s| s.eq_ignore_ascii_case("et"));
                m.start >= from && !verb
            })
            .is_some()
        })
    })
}

/// Discovery circumstance flags, tested on lead-in paragraphs only.
pub fn discovery(paragraphs: &[Paragraph]) -> Vec<(&'static str, bool)> {
    let lead_ins: Vec<&str> = paragraphs
        .iter()
        .map(Paragraph::text)
        .filter(|t| is_lead_in(t))
        .collect();
    vec![
        (FOUND_IN_WATER, lead_ins.iter().any(|t| found_in_water(t))),
        (TRAFFIC, lead_ins.iter().any(|t| TRAFFIC_RULE.is_match(t))),
    ]
}

static CT_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)CT").unwrap());

/// Keyword search in the paragraphs following CT descriptions.
#[derive(Debug, Clone)]
pub struct CtKeyword {
    keyword: String,
    pattern: Regex,
}

impl CtKeyword {
    /// Compile the word-prefix search for `keyword`.
    pub fn new(keyword: impl Into<String>) -> Result<Self> {
        let keyword = keyword.into();
        let pattern = Regex::new(&format!(r"(?i)\b{}\w*\b", regex::escape(&keyword)))?;
        Ok(Self { keyword, pattern })
    }

    /// Export field name, `keywordCT: <keyword>`.
    pub fn field_name(&self) -> String {
        format!("keywordCT: {}", self.keyword)
    }

    /// True if the keyword occurs in one of the paragraphs after a
    /// paragraph mentioning CT.
    pub fn is_present(&self, paragraphs: &[Paragraph]) -> bool {
        let texts: Vec<&str> = paragraphs.iter().map(Paragraph::text).collect();
        let found = find_all(&texts, Trigger::Pattern(&CT_MENTION)).any(|i| {
            texts[i + 1..(i + 1 + CT_FOLLOWING).min(texts.len())]
                .iter()
                .any(|t| self.pattern.is_match(t))
        });
        if found {
            log::debug!("CT keyword {:?} found", self.keyword);
        }
        found
    }
}

/// Autoerotic death mentioned anywhere.
pub fn autoerotic(full_text: &str) -> bool {
    contains_ci(full_text, "autoerot")
}
