// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Router configuration for the Docvet HTTP boundary.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{self, AppState};

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // The single analysis operation.
        .route("/analyze-document", post(handlers::analyze_document))
        // Liveness payload for humans and load balancers.
        .route("/", get(handlers::root))
        // Health check for container orchestration.
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
