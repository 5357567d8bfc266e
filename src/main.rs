use bmi_registry::config::{BatchArgs, Command, EvaluateArgs, FormArgs};
use bmi_registry::core::form::{measurement_from_raw, BMI_FIELD, REDUCTION_FIELD};
use bmi_registry::utils::{logger, validation::Validate};
use bmi_registry::{evaluate, BatchEngine, BatchPipeline, BmiForm, CliConfig, LocalStorage};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    match config.command {
        Command::Evaluate(args) => run_evaluate(&args)?,
        Command::Form(args) => run_form(args),
        Command::Batch(args) => run_batch(args).await,
    }

    Ok(())
}

fn run_evaluate(args: &EvaluateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input = measurement_from_raw(&args.weight, &args.feet, &args.inches);

    // 缺體重或身高時不輸出結果，與表單行為一致
    let Some(evaluation) = evaluate(&input) else {
        tracing::warn!("Weight and height (feet) are required, nothing to evaluate");
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        println!("BMI: {}", evaluation.bmi);
        println!("Weight reduction goal: {} lb", evaluation.reduction_goal);
    }
    Ok(())
}

fn run_form(args: FormArgs) {
    let mut form = BmiForm::from_fields(args.fields.into_iter().collect());

    if form.recalculate().is_none() {
        tracing::info!("Form is incomplete, outputs left unchanged");
    }

    for (id, value) in form.fields() {
        println!("{}={}", id, value);
    }
    tracing::debug!(
        "bmi={:?} weightreduction={:?}",
        form.get(BMI_FIELD),
        form.get(REDUCTION_FIELD)
    );
}

async fn run_batch(args: BatchArgs) {
    if let Err(e) = args.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code().max(1));
    }

    let storage = LocalStorage::new(args.output_path.clone());
    let pipeline = BatchPipeline::new(storage, args);
    let engine = BatchEngine::new(pipeline);

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
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
