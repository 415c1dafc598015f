use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use projectx::config::Config;
use projectx::db::UsersStorage;
use projectx::service::generator::GeminiClient;
use projectx::service::identity::ClerkIdentity;
use projectx::service::view_actor;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Arc::new(Config::load()?);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        listen_addr = %cfg.basic.listen_addr,
        loglevel = %cfg.basic.loglevel,
        gemini_model = %cfg.gemini.default_model,
        gemini_key = cfg.gemini.api_key.is_some(),
        publishable_key = cfg.identity.publishable_key.is_some(),
    );
    if cfg.basic.cookie_secret.is_none() {
        warn!("no cookie_secret configured; sessions will not survive a restart");
    }

    let users = UsersStorage::connect(&cfg.basic.database_url).await?;
    let identity = Arc::new(ClerkIdentity::from_config(&cfg.identity)?);
    let generator = Arc::new(GeminiClient::new(
        GeminiClient::http_client(&cfg.gemini)?,
        &cfg.gemini,
    ));
    let views = view_actor::spawn().await?;

    let state = projectx::AppState::new(cfg.clone(), users, identity, generator, views);
    let app = projectx::app_router(state);

    let listener = TcpListener::bind(cfg.basic.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
