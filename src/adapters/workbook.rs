use crate::core::coerce::{is_empty, parse_full_date_str};
use crate::domain::model::{CellValue, Row};
use crate::utils::error::{EtlError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::collections::HashSet;
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    /// xlsx / xlsm / xlsb / xls / ods
    Workbook,
}

impl InputFormat {
    /// 依副檔名判斷，URL 的查詢字串會先去除
    pub fn from_location(location: &str) -> Self {
        let path = location.split(['?', '#']).next().unwrap_or(location);
        let is_csv = std::path::Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            InputFormat::Csv
        } else {
            InputFormat::Workbook
        }
    }
}

/// 解碼第一個工作表：第一列為欄名，其餘每列轉成 `Row`
pub fn decode_rows(bytes: Vec<u8>, format: InputFormat) -> Result<Vec<Row>> {
    let rows = match format {
        InputFormat::Csv => decode_csv(&bytes)?,
        InputFormat::Workbook => decode_workbook(bytes)?,
    };
    tracing::debug!("Decoded {} data rows ({:?})", rows.len(), format);
    Ok(rows)
}

fn decode_workbook(bytes: Vec<u8>) -> Result<Vec<Row>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    if let Some(name) = workbook.sheet_names().first() {
        tracing::debug!("Reading first sheet '{}'", name);
    }

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EtlError::decode("workbook contains no sheets"))??;

    let mut sheet_rows = range.rows();
    let Some(header_cells) = sheet_rows.next() else {
        return Ok(Vec::new());
    };
    let headers = unique_headers(header_cells.iter().map(|cell| cell.to_string()));

    Ok(sheet_rows
        .filter_map(|cells| {
            build_row(
                &headers,
                (0..headers.len())
                    .map(|idx| cells.get(idx).map(cell_from_data).unwrap_or(CellValue::Empty)),
            )
        })
        .collect())
}

fn decode_csv(bytes: &[u8]) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers = unique_headers(reader.headers()?.iter().map(str::to_string));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells = (0..headers.len()).map(|idx| match record.get(idx) {
            Some(value) if !value.is_empty() => CellValue::String(value.to_string()),
            _ => CellValue::Empty,
        });
        if let Some(row) = build_row(&headers, cells) {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// 全空白的列回傳 `None`
fn build_row(headers: &[String], cells: impl Iterator<Item = CellValue>) -> Option<Row> {
    let row: Row = headers.iter().cloned().zip(cells).collect();
    let has_value = row.cells().any(|(_, value)| !is_empty(value));
    has_value.then_some(row)
}

/// 空欄名補成 `__EMPTY`，重複欄名加上 `_1`、`_2` 後綴
fn unique_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.map(|header| {
        let base = if header.trim().is_empty() {
            "__EMPTY".to_string()
        } else {
            header
        };
        let mut candidate = base.clone();
        let mut counter = 1;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{}_{}", base, counter);
            counter += 1;
        }
        candidate
    })
    .collect()
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        // 由 calamine 依活頁簿的 1900/1904 基準換算
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_full_date_str(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::String(s.clone())),
        other => CellValue::String(other.to_string()),
    }
}
