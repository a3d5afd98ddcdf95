//! Wordle Game Server
//!
//! Loads the dictionary, then serves games over WebSocket until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use wordle_server::{Dictionary, GameEngine, GameServer, MemoryStore, ServerConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Wordle Server v{}", VERSION);

    let config = ServerConfig::from_env();
    info!(
        "Word length: {}, attempts: {} ({} valid)",
        config.game.word_length, config.game.max_attempts, config.game.max_valid_attempts
    );

    // Refuse to serve without a dictionary
    let dictionary = Arc::new(Dictionary::new(config.game.word_length, config.dictionary.clone()));
    dictionary
        .initialize(None)
        .context("Failed to load dictionary")?;
    if dictionary.is_empty() {
        warn!("Dictionary has no words of length {}, secrets fall back to a fixed word", config.game.word_length);
    }

    let store = Arc::new(MemoryStore::<Vec<u8>>::new());
    let engine = Arc::new(GameEngine::new(config.game, dictionary, store));
    let server = Arc::new(GameServer::new(config.clone(), engine));

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            signal_server.shutdown();
        }
    });

    server
        .run()
        .await
        .with_context(|| format!("Server on {} failed", config.bind_addr))?;

    info!("Server stopped");
    Ok(())
}
