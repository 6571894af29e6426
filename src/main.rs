use watchlist_etl::utils::{logger, validation::Validate};
use watchlist_etl::{CliConfig, EtlEngine, LocalStorage, RunOutcome, WorkbookPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::from_args();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting watchlist-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = WorkbookPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(RunOutcome::Written {
            output_path,
            record_count,
            preview,
        }) => {
            tracing::info!("✅ Conversion completed successfully!");
            println!("✅ Converted {} records", record_count);
            println!("📁 Output saved to: {}", output_path);
            println!("👀 Preview:\n{}", preview);
        }
        Ok(RunOutcome::NoRows) => {
            println!("📭 No rows found in the input, nothing was written");
        }
        Err(e) => {
            tracing::error!(
                "❌ Conversion failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 依錯誤嚴重程度決定退出碼
            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
