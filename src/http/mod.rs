//! HTTP surface
//!
//! Thin axum layer over the discovery and evaluation core.
//!
//! # Routes
//!
//! | Method | Path              | Legacy alias                 |
//! |--------|-------------------|------------------------------|
//! | GET    | `/structure`      | `/api/get-opcua-structure`   |
//! | POST   | `/tag-value`      | `/api/get-tag-value`         |
//! | POST   | `/evaluate-logic` | `/evaluate_logic`            |
//! | POST   | `/evaluate-math`  | `/evaluate_math`             |
//! | GET    | `/operations`     |                              |
//! | GET    | `/favicon.ico`    |                              |
//!
//! Errors are always `{ "error": message }`; see [`ApiError`].

pub mod error;
pub mod handlers;

pub use error::ApiError;

use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::backend::AddressSpaceClient;
use crate::error::Result;

/// Shared handler state: the injected client and the channel of interest
pub struct AppState<C> {
    pub client: Arc<C>,
    pub channel: Arc<str>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            channel: self.channel.clone(),
        }
    }
}

impl<C> AppState<C> {
    pub fn new(client: Arc<C>, channel: impl Into<String>) -> Self {
        Self {
            client,
            channel: Arc::from(channel.into()),
        }
    }
}

/// Build the router for a client type
pub fn router<C>(state: AppState<C>) -> Router
where
    C: AddressSpaceClient + 'static,
{
    Router::new()
        .route("/structure", get(handlers::get_structure::<C>))
        .route("/api/get-opcua-structure", get(handlers::get_structure::<C>))
        .route("/tag-value", post(handlers::tag_value::<C>))
        .route("/api/get-tag-value", post(handlers::tag_value::<C>))
        .route("/evaluate-logic", post(handlers::evaluate_logic_handler))
        .route("/evaluate_logic", post(handlers::evaluate_logic_handler))
        .route("/evaluate-math", post(handlers::evaluate_math_handler))
        .route("/evaluate_math", post(handlers::evaluate_math_handler))
        .route("/operations", get(handlers::list_operations))
        .route("/favicon.ico", get(handlers::favicon))
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn serve<C>(state: AppState<C>, bind: SocketAddr) -> Result<()>
where
    C: AddressSpaceClient + 'static,
{
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
