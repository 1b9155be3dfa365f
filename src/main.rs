use clap::Parser;
use contrib_etl::core::ConfigProvider;
use contrib_etl::utils::error::ErrorSeverity;
use contrib_etl::utils::{logger, validation::Validate};
use contrib_etl::{CliConfig, EtlEngine, EtlError, FilePipeline, LocalStorage, TomlConfig};

fn exit_with(e: &EtlError) -> ! {
    tracing::error!(
        "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

async fn run<C: ConfigProvider + Validate>(config: C, dry_run: bool) {
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let engine = EtlEngine::new(FilePipeline::new(LocalStorage::default(), config));

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        match engine.preview().await {
            Ok(result) => match serde_json::to_string_pretty(&result.report) {
                Ok(report) => println!("{}", report),
                Err(e) => exit_with(&e.into()),
            },
            Err(e) => exit_with(&e),
        }
        return;
    }

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ ETL process completed successfully!");
            println!("✅ ETL process completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => exit_with(&e),
    }
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();
    logger::init_logger(cli.verbose, cli.log_json);

    tracing::info!("Starting contrib-etl");
    tracing::debug!("CLI config: {:?}", cli);

    match cli.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let config = match TomlConfig::from_file(&path) {
                Ok(config) => config,
                Err(e) => exit_with(&e),
            };
            tracing::info!("Pipeline: {}", config.pipeline.name);
            run(config, cli.dry_run).await;
        }
        None => {
            let dry_run = cli.dry_run;
            run(cli, dry_run).await;
        }
    }
}
