use anyhow::Result;
use clap::Parser;
use serde_json::{json, Value};
use std::io::Read;
use tempfile::TempDir;
use watchlist_etl::utils::validation::Validate;
use watchlist_etl::{
    CliConfig, EtlEngine, EtlError, LocalStorage, RunOutcome, TomlConfig, WorkbookPipeline,
};

const WATCHLIST_CSV: &str = "\
type,profileId,name,gender,National Tax No.,Passport No.,Duns Number,city,countryCode,aliases1,List 1,Active List 1,Since List 1,dateOfRegistrationArray
PERSON,1,Jane Doe,F,TX1,P1,,London,gb,J. Doe,UN,true,2019,
,,,,,,,,,,,,,
COMPANY,2,Acme Ltd,M,,P9,D1,,,Acme Trading,,,,\"1999-01-02, 2001\"
";

fn write_input(dir: &TempDir, name: &str, content: &str) -> Result<String> {
    let path = dir.path().join(name);
    std::fs::write(&path, content)?;
    Ok(path.to_string_lossy().replace('\\', "/"))
}

fn cli_config(args: &[&str]) -> CliConfig {
    CliConfig::try_parse_from(std::iter::once("watchlist-etl").chain(args.iter().copied()))
        .unwrap()
        .resolved()
}

fn read_lines(path: &std::path::Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)?;
    assert!(!content.ends_with('\n'));
    Ok(content
        .lines()
        .map(serde_json::from_str)
        .collect::<std::result::Result<_, _>>()?)
}

/// 輸出不得含 null、空字串、空陣列或空物件
fn assert_sparse(value: &Value) {
    match value {
        Value::Null => panic!("null value in output"),
        Value::String(s) => assert!(!s.trim().is_empty(), "blank string in output"),
        Value::Array(items) => {
            assert!(!items.is_empty(), "empty array in output");
            items.iter().for_each(assert_sparse);
        }
        Value::Object(map) => {
            assert!(!map.is_empty(), "empty object in output");
            map.values().for_each(assert_sparse);
        }
        _ => {}
    }
}

#[tokio::test]
async fn test_csv_to_profile_jsonl() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let input = write_input(&input_dir, "watchlist.csv", WATCHLIST_CSV)?;
    let output = output_dir.path().to_string_lossy().to_string();

    let config = cli_config(&["--input", &input, "--output-path", &output]);
    config.validate()?;

    let storage = LocalStorage::new(config.output_path.clone());
    let engine = EtlEngine::new(WorkbookPipeline::new(storage, config));

    let RunOutcome::Written {
        output_path,
        record_count,
        preview,
    } = engine.run().await?
    else {
        panic!("expected output to be written");
    };

    assert_eq!(record_count, 2);
    assert!(output_path.ends_with("watchlist.jsonl"));
    assert!(preview.starts_with("{\"type\":\"PERSON\""));

    let lines = read_lines(&output_dir.path().join("watchlist.jsonl"))?;
    assert_eq!(lines.len(), 2);
    lines.iter().for_each(assert_sparse);

    assert_eq!(
        lines[0],
        json!({
            "type": "PERSON",
            "profileId": "1",
            "name": "Jane Doe",
            "gender": "F",
            "identityNumbers": [
                {"type": "tax_no", "value": "TX1"},
                {"type": "passport_no", "value": "P1"}
            ],
            "addresses": [{"city": "London", "countryCode": "GB"}],
            "aliases": [{"name": "J. Doe", "type": "Also Known As"}],
            "lists": [{
                "id": "UN",
                "name": "UN",
                "active": true,
                "listActive": true,
                "hierarchy": [{"id": "UN", "name": "UN"}],
                "since": "2019"
            }]
        })
    );

    // 公司不輸出個人欄位與個人證號
    let company = &lines[1];
    assert!(company.get("gender").is_none());
    assert_eq!(
        company["identityNumbers"],
        json!([{"type": "duns", "value": "D1"}])
    );
    assert_eq!(
        company["aliases"],
        json!([{"companyName": "Acme Trading", "type": "Also Known As"}])
    );
    assert_eq!(
        company["dateOfRegistrationArray"],
        json!(["1999-01-02", "2001"])
    );

    Ok(())
}

#[tokio::test]
async fn test_xlsx_to_client_jsonl() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let input = input_dir.path().join("watchlist.xlsx");
    std::fs::copy(
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/watchlist.xlsx"),
        &input,
    )?;
    let input = input.to_string_lossy().replace('\\', "/");
    let output = output_dir.path().to_string_lossy().to_string();

    let config = cli_config(&["--input", &input, "--output-path", &output, "--target", "client"]);
    config.validate()?;

    let storage = LocalStorage::new(config.output_path.clone());
    let engine = EtlEngine::new(WorkbookPipeline::new(storage, config));

    let RunOutcome::Written { record_count, .. } = engine.run().await? else {
        panic!("expected output to be written");
    };
    assert_eq!(record_count, 2);

    let lines = read_lines(&output_dir.path().join("watchlist.jsonl"))?;
    lines.iter().for_each(assert_sparse);
    assert_eq!(lines[0]["type"], json!("PERSON"));
    assert_eq!(lines[0]["dateOfBirth"], json!("2020-01-01"));
    assert_eq!(lines[1]["name"], json!("Acme Ltd"));
    assert!(lines[1].get("dateOfBirth").is_none());

    Ok(())
}

#[tokio::test]
async fn test_header_only_input_writes_nothing() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let input = write_input(&input_dir, "empty.csv", "type,name\n")?;
    let output = output_dir.path().to_string_lossy().to_string();

    let config = cli_config(&["--input", &input, "--output-path", &output]);
    let storage = LocalStorage::new(config.output_path.clone());
    let engine = EtlEngine::new(WorkbookPipeline::new(storage, config));

    assert_eq!(engine.run().await?, RunOutcome::NoRows);
    assert!(!output_dir.path().join("empty.jsonl").exists());
    Ok(())
}

#[tokio::test]
async fn test_toml_config_with_compression() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let input = write_input(&input_dir, "clients.csv", "type,clientId,Forename,status\nPERSON,C-9,Jane,Active\n")?;
    let output = output_dir.path().to_string_lossy().replace('\\', "/");

    let config_path = input_dir.path().join("convert.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[pipeline]
name = "clients"

[source]
path = "{input}"

[transform]
target = "client"

[load]
output_path = "{output}"
filename = "clients-feed.jsonl"

[load.compression]
enabled = true
filename = "clients-feed.zip"
"#
        ),
    )?;

    let config = TomlConfig::from_file(&config_path)?;
    config.validate()?;

    let storage = LocalStorage::new(output.clone());
    let engine = EtlEngine::new(WorkbookPipeline::new(storage, config));
    let outcome = engine.run().await?;

    assert!(matches!(outcome, RunOutcome::Written { record_count: 1, .. }));

    let zip_data = std::fs::read(output_dir.path().join("clients-feed.zip"))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    let mut entry = archive.by_name("clients-feed.jsonl")?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;

    assert_eq!(
        serde_json::from_str::<Value>(&content)?,
        json!({"type": "PERSON", "clientId": "C-9", "status": "Active", "forename": "Jane"})
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_input_file_fails() -> Result<()> {
    let output_dir = TempDir::new()?;
    let output = output_dir.path().to_string_lossy().to_string();
    let config = cli_config(&["--input", "/no/such/dir/list.xlsx", "--output-path", &output]);

    let storage = LocalStorage::new(config.output_path.clone());
    let engine = EtlEngine::new(WorkbookPipeline::new(storage, config));

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, EtlError::IoError(_)));
    assert!(err.exit_code() > 0);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_workbook_fails_to_decode() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let input = write_input(&input_dir, "broken.xlsx", "not really a workbook")?;
    let output = output_dir.path().to_string_lossy().to_string();

    let config = cli_config(&["--input", &input, "--output-path", &output]);
    let storage = LocalStorage::new(config.output_path.clone());
    let engine = EtlEngine::new(WorkbookPipeline::new(storage, config));

    assert!(engine.run().await.is_err());
    assert!(!output_dir.path().join("broken.jsonl").exists());
    Ok(())
}
