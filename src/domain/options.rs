use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_ALIAS_TYPE: &str = "Also Known As";
pub const DEFAULT_PREVIEW_CHARS: usize = 4000;

/// 下游系統的輸出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetSchema {
    /// 名單（watchlist profile）格式
    #[default]
    Profile,
    /// 客戶建檔（client onboarding）格式
    Client,
}

impl FromStr for TargetSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" => Ok(TargetSchema::Profile),
            "client" => Ok(TargetSchema::Client),
            other => Err(format!(
                "unknown target schema '{}', expected 'profile' or 'client'",
                other
            )),
        }
    }
}

impl std::fmt::Display for TargetSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetSchema::Profile => write!(f, "profile"),
            TargetSchema::Client => write!(f, "client"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    pub target: TargetSchema,
    /// `aliases<n>` 欄使用第 n 個標籤
    pub alias_type_labels: Vec<String>,
    pub default_alias_type: String,
    /// 額外不做日期解析的欄位（原始欄名）
    pub never_date_columns: Vec<String>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            target: TargetSchema::default(),
            alias_type_labels: Vec::new(),
            default_alias_type: DEFAULT_ALIAS_TYPE.to_string(),
            never_date_columns: Vec::new(),
        }
    }
}

impl TransformOptions {
    pub fn alias_type_for(&self, suffix: Option<u32>) -> &str {
        suffix
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| self.alias_type_labels.get(idx as usize))
            .map(String::as_str)
            .filter(|label| !label.trim().is_empty())
            .unwrap_or(self.default_alias_type.as_str())
    }
}
