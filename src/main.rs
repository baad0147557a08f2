//! Traffic Feed Server
//!
//! Polls the upstream traffic feed and serves the query and status API.

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use traffic_feed::api::{self, AppState};
use traffic_feed::config::Config;
use traffic_feed::feed::{FeedEngine, HttpFlowSource, HttpSourceConfig, QueryEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    init_logging();

    let config = Config::from_env().context("invalid configuration")?;

    tracing::info!("Traffic Feed Server starting...");

    let source = HttpFlowSource::new(HttpSourceConfig {
        url: config.source_url.clone(),
        timeout: config.fetch_timeout,
    })
    .context("failed to create feed client")?;
    tracing::info!("Upstream feed: {}", source.url());

    let engine = FeedEngine::start(source, config.engine_settings());

    let state = AppState::new(
        &engine,
        QueryEngine::new(config.max_page_size),
        config.default_page_size,
        config.degraded_after,
    );
    let app = api::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    engine.stop().await;
    Ok(())
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "traffic_feed=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
