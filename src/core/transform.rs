//! Per-row transformation: one input row in, one sparse output record out.

use crate::core::builders::{build_address, build_aliases, build_list_memberships};
use crate::core::coerce::{
    cell_text, clean_and_split, clean_and_split_dates, country_code, parse_partial_date, plain_value,
};
use crate::core::columns::{normalize_header, ColumnRole, ColumnSchema, NormalizedRow};
use crate::core::identity::extract_identity_numbers;
use crate::domain::model::{CellValue, EntityKind, Record, Row};
use crate::domain::options::{TargetSchema, TransformOptions};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    /// Coerced according to the column's detected role.
    Scalar,
    /// Always a partial date.
    Date,
    /// Upper-cased two letter code.
    CountryCode,
    /// Multi-value cell split into a list.
    Codes,
    /// Multi-value cell split into a list of partial dates.
    Dates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applies {
    Any,
    Person,
    Organisation,
}

impl Applies {
    fn matches(self, kind: EntityKind) -> bool {
        match self {
            Applies::Any => true,
            Applies::Person => kind.is_person(),
            Applies::Organisation => kind.is_organisation(),
        }
    }
}

struct FieldSpec {
    output: &'static str,
    column: &'static str,
    kind: FieldKind,
    applies: Applies,
}

const fn field(output: &'static str, kind: FieldKind, applies: Applies) -> FieldSpec {
    FieldSpec {
        output,
        column: output,
        kind,
        applies,
    }
}

const PROFILE_FIELDS: &[FieldSpec] = &[
    field("type", FieldKind::Scalar, Applies::Any),
    field("profileId", FieldKind::Scalar, Applies::Any),
    field("action", FieldKind::Scalar, Applies::Any),
    field("activeStatus", FieldKind::Scalar, Applies::Any),
    field("name", FieldKind::Scalar, Applies::Any),
    field("suffix", FieldKind::Scalar, Applies::Any),
    field("gender", FieldKind::Scalar, Applies::Person),
    field("profileNotes", FieldKind::Scalar, Applies::Any),
    field("lastModifiedDate", FieldKind::Scalar, Applies::Any),
    field("countryOfRegistrationCode", FieldKind::Codes, Applies::Any),
    field("countryOfAffiliationCode", FieldKind::Codes, Applies::Any),
    field("formerlySanctionedRegionCode", FieldKind::Codes, Applies::Any),
    field("sanctionedRegionCode", FieldKind::Codes, Applies::Any),
    field("enhancedRiskCountryCode", FieldKind::Codes, Applies::Any),
    field("dateOfRegistrationArray", FieldKind::Dates, Applies::Organisation),
    field("dateOfBirthArray", FieldKind::Dates, Applies::Person),
    field("residentOfCode", FieldKind::Codes, Applies::Any),
    field("citizenshipCode", FieldKind::Codes, Applies::Any),
    field("sources", FieldKind::Codes, Applies::Any),
    field("companyUrls", FieldKind::Codes, Applies::Any),
];

const CLIENT_FIELDS: &[FieldSpec] = &[
    field("type", FieldKind::Scalar, Applies::Any),
    field("clientId", FieldKind::Scalar, Applies::Any),
    field("action", FieldKind::Scalar, Applies::Any),
    field("status", FieldKind::Scalar, Applies::Any),
    field("name", FieldKind::Scalar, Applies::Any),
    field("forename", FieldKind::Scalar, Applies::Person),
    field("middlename", FieldKind::Scalar, Applies::Person),
    field("surname", FieldKind::Scalar, Applies::Person),
    field("suffix", FieldKind::Scalar, Applies::Any),
    field("gender", FieldKind::Scalar, Applies::Person),
    field("dateOfBirth", FieldKind::Date, Applies::Person),
    field("domicileCodes", FieldKind::Codes, Applies::Person),
    field("nationalityCodes", FieldKind::Codes, Applies::Person),
    field("incorporationCountryCode", FieldKind::CountryCode, Applies::Organisation),
    field("dateOfIncorporation", FieldKind::Date, Applies::Organisation),
    field("notes", FieldKind::Scalar, Applies::Any),
    field("lastModifiedDate", FieldKind::Scalar, Applies::Any),
    field("sources", FieldKind::Codes, Applies::Any),
];

fn fields_for(target: TargetSchema) -> &'static [FieldSpec] {
    match target {
        TargetSchema::Profile => PROFILE_FIELDS,
        TargetSchema::Client => CLIENT_FIELDS,
    }
}

/// Transforms rows of one batch. Holds no per-row state.
pub struct RowTransformer<'a> {
    schema: &'a ColumnSchema,
    options: &'a TransformOptions,
}

impl<'a> RowTransformer<'a> {
    pub fn new(schema: &'a ColumnSchema, options: &'a TransformOptions) -> Self {
        Self { schema, options }
    }

    pub fn transform(&self, row: &Row) -> Record {
        let normalized = NormalizedRow::from_row(row);
        let kind = EntityKind::parse(cell_text(normalized.get("type")).as_deref());

        let mut record = Record::new();

        for spec in fields_for(self.options.target) {
            if spec.applies.matches(kind) {
                self.set_field(&mut record, &normalized, spec);
            }
        }

        record.set_if_present("identityNumbers", extract_identity_numbers(&normalized, kind));
        record.set_if_present("addresses", build_address(&normalized).map(|a| vec![a]));
        record.set_if_present(
            "aliases",
            build_aliases(&normalized, self.schema, kind, self.options),
        );
        record.set_if_present("lists", build_list_memberships(&normalized));

        record
    }

    fn set_field(&self, record: &mut Record, row: &NormalizedRow, spec: &FieldSpec) {
        let key = normalize_header(spec.column);
        let cell = row.get_key(&key);

        match spec.kind {
            FieldKind::Scalar => {
                record.set_if_present(spec.output, self.scalar(&key, cell));
            }
            FieldKind::Date => {
                record.set_if_present(spec.output, parse_partial_date(cell));
            }
            FieldKind::CountryCode => {
                record.set_if_present(spec.output, country_code(cell));
            }
            FieldKind::Codes => {
                record.set_if_present(spec.output, clean_and_split(cell));
            }
            FieldKind::Dates => {
                record.set_if_present(spec.output, clean_and_split_dates(cell));
            }
        }
    }

    fn scalar(&self, key: &str, cell: &CellValue) -> Option<Value> {
        match self.schema.role_of(key) {
            ColumnRole::Identifier | ColumnRole::Alias { .. } => cell_text(cell).map(Value::String),
            ColumnRole::Date => parse_partial_date(cell).map(Value::String),
            ColumnRole::Plain => plain_value(cell),
        }
    }
}

/// Convenience for a single row outside a batch.
pub fn transform_row(row: &Row, options: &TransformOptions) -> Record {
    let schema = ColumnSchema::detect(row.headers(), options);
    RowTransformer::new(&schema, options).transform(row)
}
