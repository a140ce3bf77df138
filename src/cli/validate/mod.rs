//! Validate command - checks the configuration without starting a server

use crate::config::AppConfig;

/// Load the configuration, validate it, and print the architectures
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let models = config.model_configs()?;

    println!("Configuration OK");
    println!("  redis: {}:{}", config.redis.host, config.redis.port);
    println!("  inference server: {}", config.inference_server.url);
    println!("  index backend: {:?}", config.index.backend);
    println!("  architectures ({}):", models.len());

    for model in &models {
        println!(
            "    {} - {} [{}] endpoint={} rag={} rerank={}",
            model.id,
            model.name,
            model.model_type,
            model.endpoint,
            model.uses_rag,
            model.uses_reranking
        );
    }

    Ok(())
}
