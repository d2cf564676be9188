//! Record assembly: runs every extractor over one document.
//!
//! Fields are set in a fixed order so that a batch's column order only
//! depends on which fields its documents produce. Keyword-driven extractors
//! are compiled once per [`Assembler`].

use crate::error::Result;
use crate::extract::flags::{self, CtKeyword};
use crate::extract::identifiers::{self, CASE_NOT_FOUND, CPR_NOT_FOUND, DATE_NOT_FOUND};
use crate::extract::lesions::{self, LesionMatcher};
use crate::extract::measurements::{
    self, FluidVolumes, OrganSizes, OrganWeights, WallThickness,
};
use crate::extract::narrative::{self, DISEASE_SIGNS_NOT_FOUND};
use crate::extract::{demographics, putrefaction, Diagnostics, ExtractOptions};
use crate::model::{fields, Collision, Document, FieldValue, Record};

/// A record together with the problems met while building it.
#[derive(Debug, Clone)]
pub struct AssembledRecord {
    /// The extracted fields
    pub record: Record,
    /// Non-fatal extraction problems
    pub diagnostics: Diagnostics,
}

/// Builds one [`Record`] per document.
#[derive(Debug, Clone)]
pub struct Assembler {
    options: ExtractOptions,
    weights: OrganWeights,
    sizes: OrganSizes,
    walls: WallThickness,
    fluids: FluidVolumes,
    ct: CtKeyword,
    lesions: Option<LesionMatcher>,
}

impl Assembler {
    /// Compile the keyword-driven extractors.
    pub fn new(options: ExtractOptions) -> Result<Self> {
        let lesions = options
            .lesions
            .as_ref()
            .map(LesionMatcher::new)
            .transpose()?;
        Ok(Self {
            weights: OrganWeights::new(&options.weight_keywords)?,
            sizes: OrganSizes::new(&options.size_keywords)?,
            walls: WallThickness::new(&options.wall_keywords)?,
            fluids: FluidVolumes::new(&options.fluid_keywords)?,
            ct: CtKeyword::new(options.ct_keyword.clone())?,
            lesions,
            options,
        })
    }

    /// The options this assembler was built from.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract every field of `doc`.
    pub fn assemble(&self, doc: &Document) -> AssembledRecord {
        let full_text = doc.full_text();
        let paragraphs = doc.paragraphs();
        let mut diagnostics = Diagnostics::new();
        let mut record = Record::new();

        let set = |record: &mut Record, name: &str, value: FieldValue, collision: Collision| {
            if !record.set(name, value, collision) {
                log::debug!("{}: keeping earlier value of {:?}", doc.name, name);
            }
        };

        // Identifiers and demographics have fixed, distinct names.
        let fixed = Collision::Overwrite;
        set(&mut record, fields::FILE_NAME, FieldValue::Text(doc.name.clone()), fixed);
        set(
            &mut record,
            fields::CPR_NUMBER,
            FieldValue::text_or(identifiers::cpr_number(doc), CPR_NOT_FOUND),
            fixed,
        );
        set(
            &mut record,
            fields::AUT_NUMBER,
            FieldValue::text_or(identifiers::case_number(doc), CASE_NOT_FOUND),
            fixed,
        );
        set(
            &mut record,
            fields::PRIM_STATUS,
            FieldValue::Text(identifiers::report_status(&full_text).label().to_string()),
            fixed,
        );
        set(
            &mut record,
            fields::AUTOPSY_DATE,
            FieldValue::text_or(identifiers::autopsy_date(doc), DATE_NOT_FOUND),
            fixed,
        );

        let (age, age_unit) = match demographics::try_age(&full_text) {
            None => (FieldValue::Absent, FieldValue::Absent),
            Some(result) => {
                let age = match result {
                    Ok(age) => age,
                    Err((age, err)) => {
                        diagnostics.malformed(fields::AGE, err);
                        age
                    }
                };
                let value = match (age.value, age.unit) {
                    (Some(n), _) => FieldValue::Int(n),
                    (None, demographics::AgeUnit::Stillborn | demographics::AgeUnit::Newborn) => {
                        FieldValue::Text(demographics::NO_NUMERIC_AGE.to_string())
                    }
                    (None, _) => FieldValue::Absent,
                };
                (value, FieldValue::Text(age.unit.label().to_string()))
            }
        };
        set(&mut record, fields::AGE, age, fixed);
        set(&mut record, fields::AGE_UNIT, age_unit, fixed);
        set(
            &mut record,
            fields::SEX,
            demographics::sex(&full_text)
                .map(|s| FieldValue::Text(s.label().to_string()))
                .into(),
            fixed,
        );

        // Measurement families share a namespace; the first family to
        // produce a name keeps it.
        let measured = Collision::KeepFirst;
        let region = measurements::internal_region(&full_text);
        for (name, grams) in self.weights.extract(region, &mut diagnostics) {
            set(&mut record, &name, FieldValue::Int(grams), measured);
        }
        for (organ, dims) in self.sizes.extract(region, &mut diagnostics) {
            set(&mut record, &format!("{}_højde", organ), FieldValue::Float(dims.height), measured);
            set(&mut record, &format!("{}_bredde", organ), FieldValue::Float(dims.width), measured);
            set(&mut record, &format!("{}_dybde", organ), FieldValue::Float(dims.depth), measured);
        }
        for (name, mm) in self.walls.extract(region, &mut diagnostics) {
            set(&mut record, &name, FieldValue::Int(mm), measured);
        }
        for (name, ml) in self.fluids.extract(region, &mut diagnostics) {
            set(&mut record, &name, ml.into(), measured);
        }

        // Height and weight belong to the external examination, before the
        // internal region starts.
        let body = measurements::body_measurements(&full_text, &mut diagnostics);
        set(&mut record, fields::HEIGHT, body.height_cm.into(), fixed);
        set(&mut record, fields::BODY_WEIGHT, body.weight.into(), fixed);
        set(
            &mut record,
            fields::WEIGHT_UNIT,
            body.weight_unit.map(|u| FieldValue::Text(u.to_string())).into(),
            fixed,
        );

        set(
            &mut record,
            fields::PUTREFACTION,
            putrefaction::sentences(&full_text).map(FieldValue::Text).into(),
            fixed,
        );
        set(
            &mut record,
            fields::PUTREFACTION_LEVEL,
            FieldValue::Text(putrefaction::degree(&full_text).label().to_string()),
            fixed,
        );
        set(
            &mut record,
            fields::AUTOEROTIC,
            FieldValue::Flag(flags::autoerotic(&full_text)),
            fixed,
        );

        // Keyword flags replace any earlier field of the same name.
        let flagged = Collision::Overwrite;
        for (label, found) in flags::cause_of_death(&full_text) {
            set(&mut record, label, FieldValue::Flag(found), flagged);
        }

        set(
            &mut record,
            fields::COD_TEXT,
            narrative::cause_of_death_text(&full_text).map(FieldValue::Text).into(),
            fixed,
        );
        set(
            &mut record,
            fields::FINDING_TEXT,
            FieldValue::text_or_absent(narrative::finding_text(paragraphs)),
            fixed,
        );
        set(
            &mut record,
            fields::VACCINE_TEXT,
            FieldValue::text_or_absent(narrative::vaccine_text(paragraphs)),
            fixed,
        );
        for (label, found) in flags::discovery(paragraphs) {
            set(&mut record, label, FieldValue::Flag(found), flagged);
        }
        set(
            &mut record,
            &self.ct.field_name(),
            FieldValue::Flag(self.ct.is_present(paragraphs)),
            flagged,
        );

        let texts = [
            (fields::FOAM_TEXT, FieldValue::text_or_absent(narrative::foam_text(paragraphs))),
            (fields::STRIP_TEXT, FieldValue::text_or_absent(narrative::strip_text(paragraphs))),
            (
                fields::DISEASE_SIGNS,
                FieldValue::text_or(narrative::disease_signs(paragraphs), DISEASE_SIGNS_NOT_FOUND),
            ),
            (fields::KNOWN_CONDITIONS, narrative::known_conditions(paragraphs).map(FieldValue::Text).into()),
            (fields::HEART_TEXT, narrative::heart_text(paragraphs).map(FieldValue::Text).into()),
            (fields::AORTA_TEXT, narrative::aorta_text(paragraphs).map(FieldValue::Text).into()),
            (fields::CAROTID_TEXT, narrative::carotid_text(paragraphs).map(FieldValue::Text).into()),
        ];
        for (name, value) in texts {
            set(&mut record, name, value, fixed);
        }

        if let Some(matcher) = &self.lesions {
            let found = matcher.extract(paragraphs);
            for (name, value) in lesions::fields(&found) {
                set(&mut record, &name, value, fixed);
            }
        }

        for d in diagnostics.iter() {
            log::warn!("{}: {}", doc.name, d);
        }
        log::debug!("{}: {} fields", doc.name, record.len());

        AssembledRecord {
            record,
            diagnostics,
        }
    }
}
