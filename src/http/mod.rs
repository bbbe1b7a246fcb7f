//! HTTP Module
//!
//! JSON CRUD API over a `RecordStore`.
//!
//! ## Routes
//! - `GET    /readyz`        - readiness probe, body `OK`
//! - `POST   /records`       - create, 201 `{"ID": n}`
//! - `GET    /records/{id}`  - read, 200 record JSON
//! - `PUT    /records/{id}`  - edit, 200
//! - `DELETE /records/{id}`  - delete, 204
//!
//! Errors carry `{"errText": "..."}`; a missing record is 404.

mod error;
mod handlers;
mod payload;

use std::future::Future;
use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::engine::RecordStore;

pub use error::{ApiError, ErrorResponse};
pub use payload::{CreateResponse, RecordPayload};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Run a blocking store call off the async workers
    pub(crate) async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn RecordStore) -> crate::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(outcome?)
    }
}

/// Build the router with CORS applied
pub fn router(store: Arc<dyn RecordStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    Router::new()
        .route("/readyz", get(handlers::readyz))
        .route("/records", post(handlers::create_record))
        .route(
            "/records/:id",
            get(handlers::get_record)
                .put(handlers::edit_record)
                .delete(handlers::delete_record),
        )
        .layer(cors)
        .with_state(AppState::new(store))
}

/// Serve until `shutdown` resolves, then drain open connections
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> crate::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Resolves on Ctrl+C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, initiating shutdown...");
}
