//! Serve command - runs the HTTP API

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::AppConfig;
use crate::infrastructure::metrics::{create_metrics_router, init_metrics};
use crate::infrastructure::registry::ClientRegistry;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let metrics = init_metrics(&config.metrics);

    let engine = ClientRegistry::global().build_engine(&config).await?;
    info!(engine = ?engine, "CRAG engine ready");

    let mut app: Router = create_router(AppState::new(Arc::new(engine)));

    if let Some(metrics) = metrics {
        app = app.merge(create_metrics_router(metrics, &config.metrics.path));
    }

    let addr = build_socket_addr(&config)?;
    info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}
