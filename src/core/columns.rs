//! Header normalization and column role detection.
//!
//! Every header is reduced to a canonical key (NFKC, lower-case, word
//! characters only) so that `"National Tax No."`, `"national tax no"` and
//! `"nationaltaxno"` all address the same column. Column roles are decided
//! once per batch from the first row's headers using [`COLUMN_RULES`].

use crate::domain::model::{CellValue, Row};
use crate::domain::options::TransformOptions;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

const QUOTE_CHARS: &[char] = &['"', '\'', '`', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}'];

/// Canonical lookup key for a raw header. Idempotent.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || QUOTE_CHARS.contains(&c));

    let filtered: String = trimmed
        .nfkc()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    // 移除標點後相鄰字元可能可再組合
    filtered.nfkc().collect()
}

/// How a column's scalar value is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// `aliases`, `aliases1`, `aliases_2`, ...
    Alias { suffix: Option<u32> },
    /// Identifier-like; always trimmed text, never parsed as a date.
    Identifier,
    /// Parsed as a (partial) date.
    Date,
    Plain,
}

#[derive(Debug, Clone, Copy)]
enum RuleRole {
    Alias,
    Identifier,
    Date,
    Plain,
}

/// Ordered rule table over canonical keys; first match wins.
static COLUMN_RULES: Lazy<Vec<(Regex, RuleRole)>> = Lazy::new(|| {
    [
        (r"^aliases(?:\D*?(\d+))?$", RuleRole::Alias),
        (
            r"^(profileid|clientid|nationaltaxno|dunsnumber|legalentityidentifierlei|nationalid|drivinglicenceno|socialsecurityno|passportno)$",
            RuleRole::Identifier,
        ),
        (r"array$", RuleRole::Plain),
        (r"^(since|to)list\d+$", RuleRole::Date),
        (r"(^dateof|date$)", RuleRole::Date),
    ]
    .into_iter()
    .map(|(pattern, role)| (Regex::new(pattern).expect("valid column rule"), role))
    .collect()
});

/// Classify a canonical key against the rule table.
pub fn classify(key: &str) -> ColumnRole {
    for (pattern, role) in COLUMN_RULES.iter() {
        if let Some(caps) = pattern.captures(key) {
            return match role {
                RuleRole::Alias => ColumnRole::Alias {
                    suffix: caps.get(1).and_then(|m| m.as_str().parse().ok()),
                },
                RuleRole::Identifier => ColumnRole::Identifier,
                RuleRole::Date => ColumnRole::Date,
                RuleRole::Plain => ColumnRole::Plain,
            };
        }
    }
    ColumnRole::Plain
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasColumn {
    pub key: String,
    pub suffix: Option<u32>,
}

/// Column roles for one batch, detected from the header row.
#[derive(Debug, Clone, Default)]
pub struct ColumnSchema {
    roles: HashMap<String, ColumnRole>,
    aliases: Vec<AliasColumn>,
    never_date: HashSet<String>,
}

impl ColumnSchema {
    pub fn detect<'a>(headers: impl IntoIterator<Item = &'a str>, options: &TransformOptions) -> Self {
        let never_date: HashSet<String> = options
            .never_date_columns
            .iter()
            .map(|c| normalize_header(c))
            .collect();

        let mut schema = ColumnSchema {
            never_date,
            ..ColumnSchema::default()
        };

        for header in headers {
            let key = normalize_header(header);
            if schema.roles.contains_key(&key) {
                continue;
            }

            let role = if schema.never_date.contains(&key) {
                ColumnRole::Identifier
            } else {
                classify(&key)
            };

            if let ColumnRole::Alias { suffix } = role {
                schema.aliases.push(AliasColumn {
                    key: key.clone(),
                    suffix,
                });
            }
            schema.roles.insert(key, role);
        }

        tracing::debug!(
            "🧭 Column schema: {} columns, {} alias columns, {} date columns",
            schema.roles.len(),
            schema.aliases.len(),
            schema.date_columns().count()
        );
        schema
    }

    /// Detect from the first row of a batch; an empty batch yields an empty schema.
    pub fn from_rows(rows: &[Row], options: &TransformOptions) -> Self {
        match rows.first() {
            Some(row) => Self::detect(row.headers(), options),
            None => Self::detect(std::iter::empty(), options),
        }
    }

    /// Role of a canonical key; columns missing from the header row fall back to the rule table.
    pub fn role_of(&self, key: &str) -> ColumnRole {
        match self.roles.get(key) {
            Some(role) => *role,
            None if self.never_date.contains(key) => ColumnRole::Identifier,
            None => classify(key),
        }
    }

    pub fn alias_columns(&self) -> &[AliasColumn] {
        &self.aliases
    }

    pub fn date_columns(&self) -> impl Iterator<Item = &str> {
        self.roles
            .iter()
            .filter(|(_, role)| **role == ColumnRole::Date)
            .map(|(key, _)| key.as_str())
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// A row keyed by canonical header. Colliding headers: last value wins.
#[derive(Debug, Clone, Default)]
pub struct NormalizedRow {
    cells: HashMap<String, CellValue>,
}

impl NormalizedRow {
    pub fn from_row(row: &Row) -> Self {
        let mut cells = HashMap::with_capacity(row.len());
        for (header, value) in row.cells() {
            let key = normalize_header(header);
            if let Some(previous) = cells.insert(key, value.clone()) {
                tracing::debug!(
                    "Header '{}' collides with an earlier column; replacing {:?}",
                    header,
                    previous
                );
            }
        }
        Self { cells }
    }

    /// Look up by raw or canonical header; missing columns read as empty.
    pub fn get(&self, header: &str) -> &CellValue {
        self.cells
            .get(&normalize_header(header))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn get_key(&self, key: &str) -> &CellValue {
        self.cells.get(key).unwrap_or(&EMPTY_CELL)
    }
}
