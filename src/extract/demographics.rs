//! Age and sex of the deceased.

use super::pattern::parse_int;
use super::Malformed;
use once_cell::sync::Lazy;
use regex::Regex;

static STILLBORN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bdødfødt").unwrap());
static NEWBORN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bnyfødt").unwrap());
static FETAL_WEEKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bfosteruge (\d{1,2})").unwrap());
static MONTHS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,3}) måneder gam(?:mel|le)?\b").unwrap());
static WEEKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2}) uger gam(?:mel|le)?\b").unwrap());
static DAYS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2}) dage gam(?:mel|le)?\b").unwrap());
static YEARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d{1,3})-årig(?:e)?\b").unwrap());

static SEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(årig[^.]*(mand|kvinde))|((gammel|gamle|årige)[^.]*(dreng|pige))").unwrap()
});

/// Unit an age is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeUnit {
    /// Stillborn; no numeric age
    Stillborn,
    /// Newborn; no numeric age
    Newborn,
    /// Gestational week
    FetalWeeks,
    /// Months
    Months,
    /// Weeks
    Weeks,
    /// Days
    Days,
    /// Years
    Years,
}

impl AgeUnit {
    /// Export label.
    pub fn label(&self) -> &'static str {
        match self {
            AgeUnit::Stillborn => "stillborn",
            AgeUnit::Newborn => "newborn",
            AgeUnit::FetalWeeks => "fetal weeks",
            AgeUnit::Months => "mon",
            AgeUnit::Weeks => "wk",
            AgeUnit::Days => "days",
            AgeUnit::Years => "yrs",
        }
    }
}

/// An age with its unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Age {
    /// Numeric value; `None` for stillborn and newborn
    pub value: Option<i64>,
    /// Unit of the value
    pub unit: AgeUnit,
}

/// Placeholder exported as the age of stillborn and newborn.
pub const NO_NUMERIC_AGE: &str = ".";

/// Age of the deceased; the first matching category wins.
pub fn age(text: &str) -> Option<Age> {
    try_age(text).map(|r| r.unwrap_or_else(|(age, _)| age))
}

/// Like [`age`], but reports a capture that could not be parsed.
///
/// The unit is still known when the number is malformed, so the error
/// carries the partial age alongside the problem.
pub fn try_age(text: &str) -> Option<Result<Age, (Age, Malformed)>> {
    if STILLBORN.is_match(text) {
        return Some(Ok(Age {
            value: None,
            unit: AgeUnit::Stillborn,
        }));
    }
    if NEWBORN.is_match(text) {
        return Some(Ok(Age {
            value: None,
            unit: AgeUnit::Newborn,
        }));
    }
    let numbered: [(&Regex, AgeUnit); 5] = [
        (&*FETAL_WEEKS, AgeUnit::FetalWeeks),
        (&*MONTHS, AgeUnit::Months),
        (&*WEEKS, AgeUnit::Weeks),
        (&*DAYS, AgeUnit::Days),
        (&*YEARS, AgeUnit::Years),
    ];
    numbered.iter().find_map(|(re, unit)| {
        re.captures(text).map(|c| match parse_int(&c[1]) {
            Ok(n) => Ok(Age {
                value: Some(n),
                unit: *unit,
            }),
            Err(err) => Err((
                Age {
                    value: None,
                    unit: *unit,
                },
                err,
            )),
        })
    })
}

/// Sex of the deceased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    /// Male (`mand`, `dreng`)
    Male,
    /// Female (`kvinde`, `pige`)
    Female,
}

impl Sex {
    /// Export label.
    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "K",
        }
    }
}

/// Sex from the `N-årig mand` / `N år gammel pige` phrasing.
pub fn sex(text: &str) -> Option<Sex> {
    let c = SEX.captures(text)?;
    let word = c.get(2).or_else(|| c.get(5))?;
    match word.as_str() {
        "mand" | "dreng" => Some(Sex::Male),
        "kvinde" | "pige" => Some(Sex::Female),
        _ => None,
    }
}
