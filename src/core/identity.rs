use crate::core::coerce::cell_text;
use crate::core::columns::NormalizedRow;
use crate::domain::model::{EntityKind, IdentityNumber, IdentityNumberType};

const TAX_NUMBER_COLUMN: (&str, IdentityNumberType) = ("National Tax No.", IdentityNumberType::TaxNo);

const ORGANISATION_COLUMNS: &[(&str, IdentityNumberType)] = &[
    ("Duns Number", IdentityNumberType::Duns),
    ("Legal Entity Identifier (LEI)", IdentityNumberType::Lei),
];

const PERSON_COLUMNS: &[(&str, IdentityNumberType)] = &[
    ("National ID", IdentityNumberType::NationalId),
    ("Driving Licence No.", IdentityNumberType::DrivingLicence),
    ("Social Security No.", IdentityNumberType::Ssn),
    ("Passport No.", IdentityNumberType::PassportNo),
];

fn columns_for(kind: EntityKind) -> &'static [(&'static str, IdentityNumberType)] {
    match kind {
        EntityKind::Person => PERSON_COLUMNS,
        EntityKind::Company | EntityKind::Organisation => ORGANISATION_COLUMNS,
        EntityKind::Other => &[],
    }
}

/// Tax number first, then the entity type's own identifiers in fixed order.
pub fn extract_identity_numbers(row: &NormalizedRow, kind: EntityKind) -> Vec<IdentityNumber> {
    std::iter::once(&TAX_NUMBER_COLUMN)
        .chain(columns_for(kind))
        .filter_map(|(column, id_type)| {
            cell_text(row.get(column)).map(|value| IdentityNumber {
                kind: *id_type,
                value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CellValue, Row};

    fn row(cells: &[(&str, CellValue)]) -> NormalizedRow {
        let row: Row = cells.iter().cloned().collect();
        NormalizedRow::from_row(&row)
    }

    fn types(ids: &[IdentityNumber]) -> Vec<IdentityNumberType> {
        ids.iter().map(|id| id.kind).collect()
    }

    fn all_columns() -> NormalizedRow {
        row(&[
            ("National Tax No.", "TX1".into()),
            ("Duns Number", CellValue::Number(150483782.0)),
            ("Legal Entity Identifier (LEI)", "5493001KJTIIGC8Y1R12".into()),
            ("National ID", "NI-1".into()),
            ("Driving Licence No.\t", "DL-1".into()),
            ("Social Security No.", "123-45-6789".into()),
            ("Passport No.\t", " P1 ".into()),
        ])
    }

    #[test]
    fn test_person_identifiers_in_fixed_order() {
        let ids = extract_identity_numbers(&all_columns(), EntityKind::Person);
        assert_eq!(
            types(&ids),
            vec![
                IdentityNumberType::TaxNo,
                IdentityNumberType::NationalId,
                IdentityNumberType::DrivingLicence,
                IdentityNumberType::Ssn,
                IdentityNumberType::PassportNo,
            ]
        );
        assert_eq!(ids[4].value, "P1");
    }

    #[test]
    fn test_company_identifiers() {
        let ids = extract_identity_numbers(&all_columns(), EntityKind::Company);
        assert_eq!(
            types(&ids),
            vec![IdentityNumberType::TaxNo, IdentityNumberType::Duns, IdentityNumberType::Lei]
        );
        assert_eq!(ids[1].value, "150483782");
    }

    #[test]
    fn test_organisation_matches_company() {
        let org = extract_identity_numbers(&all_columns(), EntityKind::Organisation);
        let company = extract_identity_numbers(&all_columns(), EntityKind::Company);
        assert_eq!(org, company);
    }

    #[test]
    fn test_unknown_type_only_gets_tax_number() {
        let ids = extract_identity_numbers(&all_columns(), EntityKind::Other);
        assert_eq!(types(&ids), vec![IdentityNumberType::TaxNo]);
    }

    #[test]
    fn test_empty_cells_are_skipped() {
        let ids = extract_identity_numbers(
            &row(&[("National Tax No.", "nan".into()), ("Passport No.", "".into())]),
            EntityKind::Person,
        );
        assert!(ids.is_empty());
    }
}
