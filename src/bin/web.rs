//! Consilium HTTP 服务
//!
//! 启动: cargo run --bin consilium-web --features web
//! 端口取 CONSILIUM_WEB_PORT，缺省为配置中的 web.port

#![cfg(feature = "web")]

use std::sync::Arc;

use anyhow::Context;
use consilium::config::load_config;
use consilium::{observability, web, OrchestrationContext};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).context("Failed to load config")?;
    let context = Arc::new(
        OrchestrationContext::from_config(&cfg)
            .await
            .context("Failed to initialize agents")?,
    );
    let app = web::router(Arc::clone(&context));

    let port = std::env::var("CONSILIUM_WEB_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(cfg.web.port);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Consilium API: http://{}", addr);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    context.shutdown().await;
    Ok(())
}
