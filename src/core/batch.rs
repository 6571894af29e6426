use crate::core::columns::ColumnSchema;
use crate::core::transform::RowTransformer;
use crate::domain::model::{BatchOutcome, JsonlBatch, Row};
use crate::domain::options::TransformOptions;
use crate::utils::error::Result;
use std::path::Path;

pub const PREVIEW_TRUNCATION_MARKER: &str = "\n\n...preview truncated...";

/// 轉換整批資料列並組成 JSONL
///
/// 欄位角色只由第一列的欄名偵測一次；每列獨立轉換。空白列不輸出，
/// 沒有任何紀錄時回傳 `BatchOutcome::NoRows`。
pub fn convert_rows(
    rows: &[Row],
    options: &TransformOptions,
    preview_chars: usize,
) -> Result<BatchOutcome> {
    if rows.is_empty() {
        tracing::warn!("📭 No rows found in input");
        return Ok(BatchOutcome::NoRows);
    }

    let schema = ColumnSchema::from_rows(rows, options);
    let transformer = RowTransformer::new(&schema, options);

    let mut lines = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let record = transformer.transform(row);
        if record.is_empty() {
            tracing::debug!("Row {} produced no fields, skipping", index + 1);
            continue;
        }
        lines.push(serde_json::to_string(&record)?);
    }

    if lines.is_empty() {
        tracing::warn!("📭 {} rows read but none produced a record", rows.len());
        return Ok(BatchOutcome::NoRows);
    }

    let record_count = lines.len();
    let jsonl = lines.join("\n");
    let preview = preview(&jsonl, preview_chars);

    tracing::info!(
        "🔧 Converted {} of {} rows into JSONL ({} bytes)",
        record_count,
        rows.len(),
        jsonl.len()
    );

    Ok(BatchOutcome::Converted(JsonlBatch {
        jsonl,
        record_count,
        preview,
    }))
}

/// 前 `max_chars` 個字元；超過時附上截斷標記
pub fn preview(jsonl: &str, max_chars: usize) -> String {
    match jsonl.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &jsonl[..cut], PREVIEW_TRUNCATION_MARKER),
        None => jsonl.to_string(),
    }
}

/// 輸入檔名換成 `.jsonl` 副檔名
pub fn output_file_name(input: &str) -> String {
    let name = input
        .split(['?', '#'])
        .next()
        .unwrap_or(input)
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(input);

    match Path::new(name).file_stem().and_then(|stem| stem.to_str()) {
        Some(stem) if !stem.is_empty() => format!("{}.jsonl", stem),
        _ => "output.jsonl".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CellValue;

    fn person(name: &str) -> Row {
        [("type", CellValue::from("PERSON")), ("name", CellValue::from(name))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_empty_input_is_no_rows() {
        let outcome = convert_rows(&[], &TransformOptions::default(), 4000).unwrap();
        assert_eq!(outcome, BatchOutcome::NoRows);
        assert_eq!(outcome.record_count(), 0);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let blank: Row = [("type", ""), ("name", " ")].into_iter().collect();
        let rows = vec![person("A"), blank.clone(), person("B")];

        let BatchOutcome::Converted(batch) =
            convert_rows(&rows, &TransformOptions::default(), 4000).unwrap()
        else {
            panic!("expected converted batch");
        };
        assert_eq!(batch.record_count, 2);
        assert_eq!(
            batch.jsonl,
            "{\"type\":\"PERSON\",\"name\":\"A\"}\n{\"type\":\"PERSON\",\"name\":\"B\"}"
        );
        assert!(!batch.jsonl.ends_with('\n'));

        let only_blank = convert_rows(&[blank], &TransformOptions::default(), 4000).unwrap();
        assert_eq!(only_blank, BatchOutcome::NoRows);
    }

    #[test]
    fn test_alias_columns_detected_from_first_row() {
        let first: Row = [("type", "PERSON"), ("name", "A"), ("aliases1", "Al")]
            .into_iter()
            .collect();
        let second: Row = [("type", "PERSON"), ("name", "B"), ("aliases1", "Bee")]
            .into_iter()
            .collect();

        let outcome = convert_rows(&[first, second], &TransformOptions::default(), 4000).unwrap();
        let BatchOutcome::Converted(batch) = outcome else {
            panic!("expected converted batch");
        };
        let lines: Vec<serde_json::Value> = batch
            .jsonl
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines[1]["aliases"][0]["name"], "Bee");
    }

    #[test]
    fn test_preview_truncation() {
        assert_eq!(preview("abcdef", 10), "abcdef");
        assert_eq!(preview("abcdef", 6), "abcdef");
        assert_eq!(preview("abcdef", 3), format!("abc{}", PREVIEW_TRUNCATION_MARKER));
        assert_eq!(preview("ééé", 2), format!("éé{}", PREVIEW_TRUNCATION_MARKER));
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("watchlist.xlsx"), "watchlist.jsonl");
        assert_eq!(output_file_name("/data/in/Export.v2.csv"), "Export.v2.jsonl");
        assert_eq!(output_file_name("C:\\exports\\list.xls"), "list.jsonl");
        assert_eq!(output_file_name("https://host/files/sdn.xlsx?sig=abc"), "sdn.jsonl");
        assert_eq!(output_file_name("noext"), "noext.jsonl");
        assert_eq!(output_file_name(""), "output.jsonl");
    }
}
