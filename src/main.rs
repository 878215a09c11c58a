use clap::Parser;
use zipdist::core::ConfigProvider;
use zipdist::utils::{logger, validation::Validate};
use zipdist::{adapters, CliConfig, DistanceEngine, DistancePipeline, FileConfig, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse().with_env_fallback();

    logger::init_cli_logger(args.verbose);

    tracing::info!("Starting zipdist");
    if args.verbose {
        tracing::debug!("CLI config: {:?}", args);
    }

    if let Some(path) = args.config.clone() {
        let config = FileConfig::from_file(&path)?;
        run(config).await
    } else {
        run(args).await
    }
}

async fn run<C>(config: C) -> anyhow::Result<()>
where
    C: ConfigProvider + Validate + 'static,
{
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let provider = match adapters::build_provider(&config) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Using provider: {}", provider.name());

    let storage = LocalStorage::new(".".to_string());
    let pipeline = DistancePipeline::new(storage, config, provider);
    let engine = DistanceEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Distances written to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Distance run failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}
