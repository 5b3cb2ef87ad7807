mod actor_framework;
mod admin_actor;
mod app_system;
mod auth;
mod clients;
mod discount_actor;
mod domain;
mod http;
mod order_actor;
mod product_actor;
mod uploads;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod mock_framework;

use anyhow::Context;
use tracing::{info, warn};

use crate::app_system::{setup_tracing, AppConfig, ShopSystem};
use crate::auth::{AuthGateway, TokenSigner};
use crate::http::AppState;
use crate::uploads::ImageStore;

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = AppConfig::from_env().context("reading configuration")?;
    if config.uses_default_secret() {
        warn!("JWT_SECRET is not set, sessions are signed with the development secret");
    }

    // Start every store actor
    let system = ShopSystem::from_config(&config);

    let auth = AuthGateway::new(
        system.admin_client.clone(),
        TokenSigner::new(config.jwt_secret.clone(), config.session_ttl),
    );
    let images = ImageStore::new(&config.upload_dir, config.max_image_bytes)
        .await
        .with_context(|| format!("creating upload directory {}", config.upload_dir.display()))?;
    let app = http::router(AppState::new(&system, auth, images), &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("binding {}", config.bind_addr()))?;
    info!("Hypermart backend starting");
    http::serve(listener, app, shutdown_signal())
        .await
        .context("serving HTTP")?;

    // The router (and its client clones) is gone now, so the actors can drain
    system.shutdown().await.map_err(anyhow::Error::msg)?;

    info!("Application completed successfully");
    Ok(())
}
