use std::sync::Arc;

use anyhow::{Context, Result};
use cinematch_engine::{Config, RecommendationService};
use cinematch_web::AppState;
use tokio::net::TcpListener;

pub async fn run_serve(config: Config, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.bind_addr.clone());

    let service = Arc::new(
        RecommendationService::start(&config)
            .await
            .context("Failed to start recommendation service")?,
    );

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    cinematch_web::serve(listener, AppState::new(Arc::clone(&service)), shutdown_signal())
        .await
        .context("HTTP server failed")?;

    service.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutdown signal received"),
        Err(e) => {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
