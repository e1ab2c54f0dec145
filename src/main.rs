use clap::Parser;
use exposure_feed::utils::{logger, validation::Validate};
use exposure_feed::{CliConfig, ExposurePipeline, FeedEngine, FeedError, LocalStorage};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting exposure-feed");
    tracing::debug!("CLI config: {:?}", cli);

    let exit_code = match run(&cli).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(
                "❌ Feed generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: &CliConfig) -> Result<(), FeedError> {
    cli.validate()?;
    let config = cli.to_feed_config()?;
    config.validate()?;

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output.path.clone());
    let pipeline = ExposurePipeline::new(storage, config)?;
    let engine = FeedEngine::new_with_monitoring(pipeline, cli.monitor);

    let report = engine.run().await?;
    if report.written.is_empty() {
        println!("✅ No changes ({} locations)", report.locations);
    } else {
        println!(
            "✅ Feed updated: {} locations, {} new",
            report.locations, report.new_locations
        );
        for path in &report.written {
            println!("📁 {}", path);
        }
    }
    Ok(())
}
