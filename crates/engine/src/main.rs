//! StreamChat Engine - Main entry point.

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use streamchat_engine::api;
use streamchat_engine::app::App;
use streamchat_engine::infrastructure::{config::RelayConfig, ollama::OllamaClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine is usually run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamchat_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting StreamChat Engine");

    let config = RelayConfig::from_env();

    let ollama_client = Arc::new(OllamaClient::new(&config.ollama_url, &config.ollama_model));
    tracing::info!(
        url = %config.ollama_url,
        model = %ollama_client.model(),
        "Ollama backend configured"
    );

    let app = Arc::new(App::new(ollama_client));

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = config.cors_layer() {
        router = router.layer(cors);
    }

    // Start server
    let addr = config.listen_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
