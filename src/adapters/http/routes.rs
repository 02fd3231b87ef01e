//! Route table.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, AppState};

/// Builds the service router; the caller supplies the state and layers.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health))
        .route("/skill", post(handlers::handle_skill))
        .route("/analysis-tasks", post(handlers::handle_analysis_task))
}
