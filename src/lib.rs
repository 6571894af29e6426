pub mod adapters;
#[cfg(feature = "cli")]
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig, CliConfig};

pub use crate::core::{
    batch::convert_rows,
    etl::{EtlEngine, RunOutcome},
    pipeline::WorkbookPipeline,
    transform::transform_row,
};
pub use crate::domain::model::{BatchOutcome, CellValue, JsonlBatch, Record, Row};
pub use crate::domain::options::{TargetSchema, TransformOptions};
pub use crate::utils::error::{EtlError, Result};
