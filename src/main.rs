use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use blog_api_rust::cli::Cli;
use blog_api_rust::config::{self, AppConfig};
use blog_api_rust::database::{MemoryStore, MongoStore, Store};
use blog_api_rust::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up MONGODB_URI and the token secrets
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config: AppConfig = config::config().clone();
    cli.apply(&mut config);

    tracing::info!("Starting Blog API in {:?} mode", config.environment);
    config.validate()?;
    if config.security.uses_default_secrets() {
        tracing::debug!("Using built-in development token secrets");
    }

    let store: Arc<dyn Store> = if cli.in_memory {
        tracing::info!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let store = MongoStore::connect(&config.database)
            .await
            .context("failed to connect to MongoDB")?;
        tracing::info!("MongoDB connected");
        Arc::new(store)
    };

    let state = AppState::new(store, &config.security);
    let router = app(state, &config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Blog API listening on http://{}", bind_addr);

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
