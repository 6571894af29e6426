use crate::domain::model::{BatchOutcome, JsonlBatch, Row};
use crate::domain::options::TransformOptions;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// 本機路徑或 http(s) URL
    fn input_location(&self) -> &str;
    fn output_path(&self) -> &str;
    /// 覆寫輸出檔名；`None` 時由輸入檔名推導
    fn output_filename(&self) -> Option<&str>;
    fn transform_options(&self) -> &TransformOptions;
    fn preview_chars(&self) -> usize;
    /// 啟用時輸出為 ZIP 封裝的 JSONL
    fn compressed_archive(&self) -> Option<&str>;
    fn request_timeout_seconds(&self) -> Option<u64> {
        None
    }
    /// 下載遠端輸入時附加的 HTTP 標頭
    fn request_headers(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Row>>;
    async fn transform(&self, rows: Vec<Row>) -> Result<BatchOutcome>;
    async fn load(&self, batch: JsonlBatch) -> Result<String>;
}
