use summary_memory_chat::{AppConfig, ConversationSummaryStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(session_key), question) = (args.next(), args.collect::<Vec<_>>().join(" ")) else {
        eprintln!("usage: chat <session-key> <question...>");
        std::process::exit(2);
    };

    let config = AppConfig::from_env()?;
    let store = ConversationSummaryStore::from_config(&config)?;
    let key = store.open(&session_key).await?;

    info!(session = %key, "Running one interaction");

    match store.interact(&key, &question).await {
        Ok(outcome) => {
            println!("\n=== ANSWER ===");
            println!("{}", outcome.answer);
            println!("\n=== LONG-TERM SUMMARY ===");
            println!("{}", outcome.summary);
            println!("\n=== RECENT TURNS ===");
            for turn in &outcome.recent_turns {
                println!("  {}", turn);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Interaction failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
