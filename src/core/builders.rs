use crate::core::coerce::{cell_text, country_code, parse_booleanish, parse_partial_date, post_code};
use crate::core::columns::{ColumnSchema, NormalizedRow};
use crate::domain::model::{Address, Alias, EntityKind, HierarchyNode, ListMembership};
use crate::domain::options::{TargetSchema, TransformOptions};

/// 名單欄位組數：`List 1` .. `List 4`
pub const LIST_SLOTS: usize = 4;

/// 單一地址；所有子欄位皆空時回傳 `None`
pub fn build_address(row: &NormalizedRow) -> Option<Address> {
    let address = Address {
        line: cell_text(row.get("Address Line")),
        city: cell_text(row.get("city")),
        province: cell_text(row.get("province")),
        post_code: post_code(row.get("postCode")),
        country_code: country_code(row.get("countryCode")),
    };
    (!address.is_blank()).then_some(address)
}

/// 依偵測到的 alias 欄位順序產生別名
pub fn build_aliases(
    row: &NormalizedRow,
    schema: &ColumnSchema,
    kind: EntityKind,
    options: &TransformOptions,
) -> Vec<Alias> {
    schema
        .alias_columns()
        .iter()
        .filter_map(|column| {
            let value = cell_text(row.get_key(&column.key))?;
            let label = options.alias_type_for(column.suffix).to_string();

            let (name, company_name) = if kind.is_organisation() {
                (None, Some(value))
            } else {
                (Some(value), None)
            };
            let (alias_type, name_type) = match options.target {
                TargetSchema::Profile => (Some(label), None),
                TargetSchema::Client => (None, Some(label)),
            };

            Some(Alias {
                name,
                company_name,
                alias_type,
                name_type,
            })
        })
        .collect()
}

/// 名單成員；`List i` 為空則整組略過
pub fn build_list_memberships(row: &NormalizedRow) -> Vec<ListMembership> {
    (1..=LIST_SLOTS)
        .filter_map(|slot| {
            let value = cell_text(row.get(&format!("List {}", slot)))?;
            let active = parse_booleanish(row.get(&format!("Active List {}", slot)));

            Some(ListMembership {
                id: value.clone(),
                name: value.clone(),
                active,
                list_active: active,
                hierarchy: vec![HierarchyNode {
                    id: value.clone(),
                    name: value,
                }],
                since: parse_partial_date(row.get(&format!("Since List {}", slot))),
                to: parse_partial_date(row.get(&format!("To List {}", slot))),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CellValue, Row};
    use serde_json::json;

    fn normalized(cells: &[(&str, CellValue)]) -> (Row, NormalizedRow) {
        let row: Row = cells.iter().cloned().collect();
        let normalized = NormalizedRow::from_row(&row);
        (row, normalized)
    }

    #[test]
    fn test_address_canonicalizes_codes() {
        let (_, row) = normalized(&[
            ("Address Line", "1 Main St".into()),
            ("postCode", "10001.0".into()),
            ("countryCode", "usa".into()),
        ]);
        let address = build_address(&row).unwrap();
        assert_eq!(
            serde_json::to_value(address).unwrap(),
            json!({"line": "1 Main St", "postCode": "10001", "countryCode": "US"})
        );
    }

    #[test]
    fn test_address_absent_when_all_blank() {
        let (_, row) = normalized(&[("city", " ".into()), ("countryCode", "nan".into())]);
        assert!(build_address(&row).is_none());
    }

    #[test]
    fn test_address_absent_when_post_code_strips_to_nothing() {
        let (_, row) = normalized(&[("postCode", ".0".into())]);
        assert!(build_address(&row).is_none());
    }

    #[test]
    fn test_aliases_for_person_profile() {
        let (raw, row) = normalized(&[
            ("aliases1", "J. Doe".into()),
            ("aliases2", "".into()),
            ("aliases3", "Janie".into()),
        ]);
        let options = TransformOptions::default();
        let schema = ColumnSchema::detect(raw.headers(), &options);

        let aliases = build_aliases(&row, &schema, EntityKind::Person, &options);
        assert_eq!(
            serde_json::to_value(aliases).unwrap(),
            json!([
                {"name": "J. Doe", "type": "Also Known As"},
                {"name": "Janie", "type": "Also Known As"}
            ])
        );
    }

    #[test]
    fn test_aliases_for_company_client_use_labels() {
        let (raw, row) = normalized(&[("Aliases 1", "Acme Ltd".into()), ("Aliases 2", "Acme Holdings".into())]);
        let options = TransformOptions {
            target: TargetSchema::Client,
            alias_type_labels: vec!["Trading As".into()],
            ..TransformOptions::default()
        };
        let schema = ColumnSchema::detect(raw.headers(), &options);

        let aliases = build_aliases(&row, &schema, EntityKind::Company, &options);
        assert_eq!(
            serde_json::to_value(aliases).unwrap(),
            json!([
                {"companyName": "Acme Ltd", "nameType": "Trading As"},
                {"companyName": "Acme Holdings", "nameType": "Also Known As"}
            ])
        );
    }

    #[test]
    fn test_list_memberships_skip_empty_slots() {
        let (_, row) = normalized(&[
            ("List 1", "OFAC SDN".into()),
            ("Active List 1", "TRUE".into()),
            ("Since List 1", "2019-03".into()),
            ("List 2", "nan".into()),
            ("Active List 2", "true".into()),
            ("List 3", "UN".into()),
            ("Active List 3", "no".into()),
            ("To List 3", CellValue::Number(43831.0)),
        ]);

        let lists = build_list_memberships(&row);
        assert_eq!(
            serde_json::to_value(lists).unwrap(),
            json!([
                {
                    "id": "OFAC SDN", "name": "OFAC SDN", "active": true, "listActive": true,
                    "hierarchy": [{"id": "OFAC SDN", "name": "OFAC SDN"}],
                    "since": "2019-03"
                },
                {
                    "id": "UN", "name": "UN", "active": false, "listActive": false,
                    "hierarchy": [{"id": "UN", "name": "UN"}],
                    "to": "2020-01-01"
                }
            ])
        );
    }

    #[test]
    fn test_list_slots_beyond_four_are_ignored() {
        let (_, row) = normalized(&[("List 5", "EU".into())]);
        assert!(build_list_memberships(&row).is_empty());
    }
}
