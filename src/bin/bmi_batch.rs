use bmi_registry::core::ConfigProvider;
use bmi_registry::domain::model::MeasurementSource;
use bmi_registry::utils::{logger, validation::Validate};
use bmi_registry::{BatchEngine, BatchPipeline, LocalStorage, TomlConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "bmi-batch")]
#[command(about = "BMI batch evaluation driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "bmi-batch.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the timing setting from the config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 日誌格式要看設定檔，所以先載入再初始化
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = BatchPipeline::new(storage, config);
    let engine = BatchEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ BMI batch completed successfully!");
            println!("✅ BMI batch completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ BMI batch failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

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
    match config.source() {
        MeasurementSource::Csv { path } => println!("  Source: CSV file {}", path),
        MeasurementSource::Api { endpoint } => println!("  Source: API {}", endpoint),
    }
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!("  Zip: {}", config.compress());

    let target = config.bmi_target();
    println!(
        "  BMI target: {} .. {}",
        target
            .lower_bound
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string()),
        target
            .upper_bound
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string())
    );

    if let Some(max_records) = config.max_records() {
        println!("  Max Records: {}", max_records);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
