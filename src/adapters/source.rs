use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// 輸入來源：本機檔案或 http(s) 下載
#[derive(Debug, Clone, PartialEq)]
pub enum SourceLocation {
    File(PathBuf),
    Remote(Url),
}

impl SourceLocation {
    pub fn parse(location: &str) -> Result<Self> {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "input".to_string(),
            });
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let url = Url::parse(trimmed).map_err(|e| EtlError::InvalidConfigValueError {
                field: "input".to_string(),
                value: trimmed.to_string(),
                reason: format!("Invalid URL format: {}", e),
            })?;
            Ok(SourceLocation::Remote(url))
        } else {
            Ok(SourceLocation::File(PathBuf::from(trimmed)))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SourceLocation::File(path) => path.display().to_string(),
            SourceLocation::Remote(url) => url.to_string(),
        }
    }
}

/// 讀取原始位元組；這是整個流程唯一的非同步邊界
pub struct SourceReader {
    client: Client,
    timeout: Option<Duration>,
    headers: HashMap<String, String>,
}

impl SourceReader {
    pub fn new(timeout_seconds: Option<u64>) -> Self {
        Self {
            client: Client::new(),
            timeout: timeout_seconds.map(Duration::from_secs),
            headers: HashMap::new(),
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub async fn fetch(&self, location: &SourceLocation) -> Result<Vec<u8>> {
        match location {
            SourceLocation::File(path) => {
                tracing::debug!("Reading input file {}", path.display());
                Ok(tokio::fs::read(path).await?)
            }
            SourceLocation::Remote(url) => self.fetch_remote(url).await,
        }
    }

    async fn fetch_remote(&self, url: &Url) -> Result<Vec<u8>> {
        let mut request = self.client.get(url.clone());

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Downloading input from: {}", url);
        let response = request.send().await?;
        tracing::debug!("Download response status: {}", response.status());

        if !response.status().is_success() {
            return Err(EtlError::decode(format!(
                "download of {} failed with status {}",
                url,
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
