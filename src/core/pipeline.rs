use crate::adapters::{decode_rows, InputFormat, SourceLocation, SourceReader};
use crate::core::batch::{convert_rows, output_file_name};
use crate::core::{BatchOutcome, ConfigProvider, JsonlBatch, Pipeline, Row, Storage};
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// 試算表 → JSONL 的完整流程
pub struct WorkbookPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    reader: SourceReader,
}

impl<S: Storage, C: ConfigProvider> WorkbookPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let reader = SourceReader::new(config.request_timeout_seconds())
            .with_headers(config.request_headers());
        Self {
            storage,
            config,
            reader,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 輸出檔名：設定覆寫優先，否則由輸入檔名推導
    fn jsonl_file_name(&self) -> String {
        match self.config.output_filename() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => output_file_name(self.config.input_location()),
        }
    }
}

/// 把 JSONL 包成單一檔案的 ZIP
fn zip_jsonl(entry_name: &str, jsonl: &str) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file::<_, ()>(entry_name, FileOptions::default())?;
    zip.write_all(jsonl.as_bytes())?;
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for WorkbookPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Row>> {
        let location = SourceLocation::parse(self.config.input_location())?;
        tracing::debug!("Fetching input from: {}", location.describe());

        let bytes = self.reader.fetch(&location).await?;
        tracing::debug!("Fetched {} bytes", bytes.len());

        decode_rows(bytes, InputFormat::from_location(self.config.input_location()))
    }

    async fn transform(&self, rows: Vec<Row>) -> Result<BatchOutcome> {
        convert_rows(
            &rows,
            self.config.transform_options(),
            self.config.preview_chars(),
        )
    }

    async fn load(&self, batch: JsonlBatch) -> Result<String> {
        let jsonl_name = self.jsonl_file_name();

        let (file_name, data) = match self.config.compressed_archive() {
            Some(archive) => {
                tracing::debug!("Packing {} into ZIP archive {}", jsonl_name, archive);
                (archive.to_string(), zip_jsonl(&jsonl_name, &batch.jsonl)?)
            }
            None => (jsonl_name, batch.jsonl.into_bytes()),
        };

        tracing::debug!("Writing {} ({} bytes) to storage", file_name, data.len());
        self.storage.write_file(&file_name, &data).await?;

        tracing::info!("👀 Preview:\n{}", batch.preview);

        Ok(format!("{}/{}", self.config.output_path(), file_name))
    }
}
