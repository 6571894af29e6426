use clap::Parser;
use watchlist_etl::adapters::{InputFormat, SourceLocation};
use watchlist_etl::core::ConfigProvider;
use watchlist_etl::utils::logger::{self, LogFormat};
use watchlist_etl::utils::validation::Validate;
use watchlist_etl::{EtlEngine, LocalStorage, RunOutcome, TomlConfig, WorkbookPipeline};

#[derive(Parser)]
#[command(name = "toml-convert")]
#[command(about = "Watchlist spreadsheet conversion driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "watchlist-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show what would be converted without reading the input
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置（日誌格式由配置決定，所以先載入）
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    let log_format: LogFormat = config.log_format().parse().unwrap_or_default();
    logger::init_logger(log_format, args.verbose);

    tracing::info!("🚀 Starting TOML-driven conversion");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
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

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name,
        config.pipeline.version.as_deref().unwrap_or("-")
    );
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Source: {}", config.input_location());
    println!("  Target: {}", config.transform_options().target);
    println!("  Output: {}", config.output_path());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    // 輸入來源
    let location = SourceLocation::parse(config.input_location())?;
    println!("📥 Input:");
    match &location {
        SourceLocation::File(path) => {
            println!("  Local file: {}", path.display());
            if !path.exists() {
                println!("  ⚠️ File does not exist yet");
            }
        }
        SourceLocation::Remote(url) => {
            println!("  Remote URL: {}", url);
            if let Some(timeout) = config.request_timeout_seconds() {
                println!("  Timeout: {}s", timeout);
            }
            let headers = config.request_headers();
            if !headers.is_empty() {
                println!("  Headers: {} custom headers", headers.len());
            }
        }
    }
    println!(
        "  Format: {:?}",
        InputFormat::from_location(config.input_location())
    );

    // 轉換選項
    let options = config.transform_options();
    println!();
    println!("⚙️ Transform:");
    println!("  Target schema: {}", options.target);
    println!("  Default alias type: {}", options.default_alias_type);
    for (idx, label) in options.alias_type_labels.iter().enumerate() {
        println!("  aliases{} -> {}", idx + 1, label);
    }
    if !options.never_date_columns.is_empty() {
        println!(
            "  Never-date columns: {}",
            options.never_date_columns.join(", ")
        );
    }

    // 輸出
    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    if let Some(filename) = config.output_filename() {
        println!("  File name: {}", filename);
    }
    println!("  Preview: {} characters", config.preview_chars());
    if let Some(archive) = config.compressed_archive() {
        println!("  Compression: {} (ZIP)", archive);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
