use anyhow::Result;
use httpmock::prelude::*;
use tempfile::TempDir;
use watchlist_etl::utils::validation::Validate;
use watchlist_etl::{EtlEngine, EtlError, LocalStorage, RunOutcome, TomlConfig, WorkbookPipeline};

fn remote_config(url: &str, output: &str) -> Result<TomlConfig> {
    let config = TomlConfig::from_toml_str(&format!(
        r#"
[pipeline]
name = "remote"

[source]
path = "{url}"
timeout_seconds = 5
headers = {{ Authorization = "Bearer test-token" }}

[transform]
alias_type_labels = ["Also Known As", "Formerly Known As"]

[load]
output_path = "{output}"
preview_chars = 10
"#
    ))?;
    config.validate()?;
    Ok(config)
}

/// 遠端 CSV 下載後轉換，並帶上設定的標頭
#[tokio::test]
async fn test_remote_csv_conversion() -> Result<()> {
    let server = MockServer::start();
    let sheet_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/exports/sdn.csv")
            .header("Authorization", "Bearer test-token");
        then.status(200)
            .header("Content-Type", "text/csv")
            .body("type,name,aliases2\nPERSON,Jane Doe,Janey\n");
    });

    let output_dir = TempDir::new()?;
    let output = output_dir.path().to_string_lossy().replace('\\', "/");
    let config = remote_config(&server.url("/exports/sdn.csv"), &output)?;

    let engine = EtlEngine::new(WorkbookPipeline::new(LocalStorage::new(output.clone()), config));
    let outcome = engine.run().await?;

    sheet_mock.assert();
    let RunOutcome::Written { preview, .. } = outcome else {
        panic!("expected output to be written");
    };
    assert_eq!(preview, "{\"type\":\"P\n\n...preview truncated...");

    let content = std::fs::read_to_string(output_dir.path().join("sdn.jsonl"))?;
    assert_eq!(
        content,
        r#"{"type":"PERSON","name":"Jane Doe","aliases":[{"name":"Janey","type":"Formerly Known As"}]}"#
    );
    Ok(())
}

#[tokio::test]
async fn test_remote_failure_status() -> Result<()> {
    let server = MockServer::start();
    let sheet_mock = server.mock(|when, then| {
        when.method(GET).path("/exports/sdn.xlsx");
        then.status(503);
    });

    let output_dir = TempDir::new()?;
    let output = output_dir.path().to_string_lossy().replace('\\', "/");
    let config = remote_config(&server.url("/exports/sdn.xlsx"), &output)?;

    let engine = EtlEngine::new(WorkbookPipeline::new(LocalStorage::new(output), config));
    let err = engine.run().await.unwrap_err();

    sheet_mock.assert();
    assert!(matches!(err, EtlError::DecodeError { .. }));
    Ok(())
}
