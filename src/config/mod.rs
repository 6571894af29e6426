pub mod cli;
pub mod toml_config;

use crate::core::batch::output_file_name;
use crate::core::ConfigProvider;
use crate::domain::options::{TargetSchema, TransformOptions, DEFAULT_PREVIEW_CHARS};
use crate::utils::error::Result;
use crate::utils::validation::{validate_input_location, validate_path, validate_range, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const MAX_PREVIEW_CHARS: usize = 1_000_000;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "watchlist-etl")]
#[command(about = "Convert watchlist spreadsheets into JSONL records")]
pub struct CliConfig {
    #[arg(long, help = "Input spreadsheet path or http(s) URL")]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "profile", help = "Output schema: profile or client")]
    pub target: TargetSchema,

    #[arg(long = "alias-type-label", help = "Alias type label for aliases<n>, repeat in order")]
    pub alias_type_labels: Vec<String>,

    #[arg(long = "never-date-column", help = "Column that must never be parsed as a date")]
    pub never_date_columns: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_PREVIEW_CHARS)]
    pub preview_chars: usize,

    #[arg(long, help = "Write the JSONL inside a ZIP archive")]
    pub compress: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(skip)]
    #[serde(skip)]
    transform: TransformOptions,

    #[arg(skip)]
    #[serde(skip)]
    archive_name: Option<String>,
}

impl CliConfig {
    /// 解析命令列參數並整理成轉換選項
    pub fn from_args() -> Self {
        Self::parse().resolved()
    }

    /// 把旗標收斂成 `TransformOptions` 與壓縮檔名
    pub fn resolved(mut self) -> Self {
        self.transform = TransformOptions {
            target: self.target,
            alias_type_labels: self.alias_type_labels.clone(),
            never_date_columns: self.never_date_columns.clone(),
            ..TransformOptions::default()
        };
        self.archive_name = self.compress.then(|| {
            output_file_name(&self.input)
                .trim_end_matches(".jsonl")
                .to_string()
                + ".zip"
        });
        self
    }
}

impl ConfigProvider for CliConfig {
    fn input_location(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_filename(&self) -> Option<&str> {
        None
    }

    fn transform_options(&self) -> &TransformOptions {
        &self.transform
    }

    fn preview_chars(&self) -> usize {
        self.preview_chars
    }

    fn compressed_archive(&self) -> Option<&str> {
        self.archive_name.as_deref()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_input_location("input", &self.input)?;
        validate_path("output_path", &self.output_path)?;
        validate_range("preview_chars", self.preview_chars, 1, MAX_PREVIEW_CHARS)?;
        Ok(())
    }
}
