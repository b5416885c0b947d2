//! HTTP gateway
//!
//! Axum router over [`BalanceService`](crate::wallet::BalanceService), with
//! Swagger UI and bounded graceful shutdown.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::Request,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{Span, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ServerConfig;
use state::AppState;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/wallet", post(handlers::change_balance))
        .route("/wallets", get(handlers::list_wallets))
        .route("/wallets/{wallet_id}", get(handlers::get_balance));

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        // Stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
}

/// Span wrapping each request; wallet and retry logs nest under it
fn request_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "http",
        method = %req.method(),
        path = %req.uri().path(),
    )
}

/// Serve until SIGINT/SIGTERM, then drain in-flight requests for at most
/// `shutdown_timeout`
pub async fn run_server(config: &ServerConfig, state: Arc<AppState>) -> std::io::Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Wallet API listening on http://{}", addr);
    info!("API Docs: http://{}/docs", addr);

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .await
    });

    tokio::select! {
        // Server exited on its own, which only happens on error
        joined = &mut server => {
            return joined.map_err(std::io::Error::other)?;
        }
        _ = shutdown_signal() => {}
    }

    info!("Shutting down, waiting up to {:?} for in-flight requests", config.shutdown_timeout());
    let _ = stop_tx.send(true);

    match tokio::time::timeout(config.shutdown_timeout(), &mut server).await {
        Ok(joined) => joined.map_err(std::io::Error::other)?,
        Err(_) => {
            warn!("Graceful shutdown timed out, dropping open connections");
            server.abort();
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
