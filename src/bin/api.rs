use std::sync::Arc;
use summary_memory_chat::{api::start_server, AppConfig, ConversationSummaryStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    info!("🚀 Summary-Memory Chat - API Server");
    info!("📍 Port: {}", config.port);
    info!("🗂  Summaries: {}", config.summary_dir.display());

    let store = Arc::new(ConversationSummaryStore::from_config(&config)?);

    info!("✅ Conversation store initialized");
    info!("📡 Starting API server...");

    start_server(store, config.port).await?;

    Ok(())
}
