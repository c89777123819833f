//! Axum-based HTTP server.

use std::future::Future;

use axum::routing::{get, post, put};
use axum::Router;
use tracing::info;

use crate::handlers;
use crate::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/verify", post(handlers::verify_body))
        .route("/verify/:code", get(handlers::verify_path))
        .route("/requests", post(handlers::submit))
        .route("/requests/pending", get(handlers::pending))
        .route("/requests/batch", post(handlers::batch))
        .route("/requests/:id", get(handlers::get_request))
        .route("/requests/:id/approve", post(handlers::approve))
        .route("/requests/:id/reject", post(handlers::reject))
        .route("/students/:usn", put(handlers::upsert_student))
        .route("/students/:usn/summary", get(handlers::student_summary))
        .route("/students/:usn/requests", get(handlers::student_requests))
        .route("/students/:usn/records/:semester", put(handlers::upsert_record))
        .route("/audit", get(handlers::audit))
        .route("/certificates/*name", get(handlers::certificate))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}

pub struct RpcServer {
    pub port: u16,
    pub state: AppState,
}

impl RpcServer {
    pub fn new(port: u16, state: AppState) -> Self {
        Self { port, state }
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn start<F>(&self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.state.clone());
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("HTTP API listening on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
