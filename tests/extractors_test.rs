//! Integration tests for the extractor catalogue.

use autmine::extract::demographics::{self, AgeUnit};
use autmine::extract::measurements::OrganSizes;
use autmine::extract::putrefaction::{self, Degree, Severity};
use autmine::extract::{narrative, Diagnostics};
use autmine::model::fields;
use autmine::{Assembler, Document, ExtractOptions, FieldValue};

fn assemble(paragraphs: &[&str]) -> autmine::Record {
    let assembler = Assembler::new(ExtractOptions::default()).unwrap();
    let doc = Document::from_paragraphs("x.docx", paragraphs.iter().copied());
    assembler.assemble(&doc).record
}

#[test]
fn test_missing_triggers_yield_sentinels() {
    let record = assemble(&["Lorem ipsum dolor sit amet.", "Intet af interesse her."]);

    assert_eq!(
        record.get(fields::CPR_NUMBER),
        Some(&FieldValue::NotFound("No CPR match"))
    );
    assert_eq!(record.get(fields::AUT_NUMBER), Some(&FieldValue::NotFound("No match")));
    assert_eq!(record.get(fields::AUTOPSY_DATE), Some(&FieldValue::NotFound("No date")));
    assert_eq!(record.get(fields::AGE), Some(&FieldValue::Absent));
    assert_eq!(record.get(fields::SEX), Some(&FieldValue::Absent));
    assert_eq!(
        record.get(fields::PUTREFACTION_LEVEL).unwrap().render(),
        "NO MENTION"
    );
    assert_eq!(
        record.get(fields::DISEASE_SIGNS).unwrap().render(),
        "TPS pattern not found"
    );
    assert_eq!(record.get("drukning"), Some(&FieldValue::Flag(false)));
    assert_eq!(record.get(fields::AORTA_TEXT), Some(&FieldValue::Absent));
}

#[test]
fn test_every_cause_of_death_flag_present() {
    let record = assemble(&[]);
    for label in [
        "uoplyst",
        "drukning",
        "hjertesvigt",
        "forgiftning",
        "hængning",
        "skud",
        "stik_snit",
        "forblødning",
        "forbrænding",
        "lungebetændelse",
        "ikke holdepunkt",
        "supp_no_change",
    ] {
        assert_eq!(record.get(label), Some(&FieldValue::Flag(false)), "{}", label);
    }
}

#[test]
fn test_most_severe_putrefaction_wins() {
    let text = "Der var ingen forrådnelse på ryggen. Lette forrådnelsesforandringer på maven.";
    assert_eq!(putrefaction::degree(text), Degree::Level(Severity::Discreet));
}

#[test]
fn test_no_mention_differs_from_no_match() {
    assert_eq!(putrefaction::degree("Liget var velbevaret."), Degree::NoMention);
    assert_eq!(putrefaction::degree("Forrådnelse blev noteret."), Degree::NoMatch);
    assert_ne!(Degree::NoMention.label(), Degree::NoMatch.label());
}

#[test]
fn test_comma_and_dot_decimals_agree() {
    let sizes = OrganSizes::new(&["Leveren"]).unwrap();
    let mut diagnostics = Diagnostics::new();
    let comma = sizes.extract("Leveren måler 12,5 x 10 x 5 cm.", &mut diagnostics);
    let dot = sizes.extract("Leveren måler 12.5 x 10 x 5 cm.", &mut diagnostics);

    assert_eq!(comma, dot);
    assert_eq!(comma[0].1.height, 12.5);
    assert!(diagnostics.is_empty());
}

#[test]
fn test_stillborn_takes_precedence_over_years() {
    let text = "Et dødfødt pigebarn. Moderen er en 31-årig kvinde.";
    let age = demographics::age(text).unwrap();
    assert_eq!(age.unit, AgeUnit::Stillborn);
    assert_eq!(age.value, None);

    let record = assemble(&[text]);
    assert_eq!(record.get(fields::AGE).unwrap().render(), ".");
    assert_eq!(record.get(fields::AGE_UNIT).unwrap().render(), "stillborn");
}

#[test]
fn test_narrative_text_is_flattened() {
    let doc = Document::from_paragraphs(
        "x.docx",
        ["Halspulsårerne er\nåbne og glatte.", "Legemspulsåren og\r\ngrene er glatte."],
    );
    assert_eq!(
        narrative::carotid_text(doc.paragraphs()).as_deref(),
        Some("Halspulsårerne er åbne og glatte.")
    );
    let aorta = narrative::aorta_text(doc.paragraphs()).unwrap();
    assert!(!aorta.contains('\n') && !aorta.contains('\r'));
}

#[test]
fn test_organ_weight_fields_named_by_keyword() {
    let record = assemble(&[
        "Indvendig undersøgelse",
        "Milten vejer 180 g. Hjertet vejer ca. 410 gram.",
    ]);
    assert_eq!(record.get("milt"), Some(&FieldValue::Int(180)));
    assert_eq!(record.get("hjerte"), Some(&FieldValue::Int(410)));
}
