// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub mod auth;
pub mod health;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/auth", post(auth::authenticate))
        .route("/auth/me", get(auth::me))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_settings;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::new(test_settings()));
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }
}
