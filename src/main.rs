use anyhow::Result;
use dkv::{config::Config, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dkv=info".parse()?),
        )
        .init();

    let config = Config::load()?;
    info!("Starting dkv with {:?}", config);

    server::run(&config).await
}
