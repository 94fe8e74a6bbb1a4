pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis;
use crate::assessment::handlers;
use crate::credits;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessment API
        .route("/api/v1/assessments", post(handlers::handle_submit))
        .route("/api/v1/assessments/latest", get(handlers::handle_latest))
        .route(
            "/api/v1/assessments/:id",
            get(handlers::handle_get_assessment),
        )
        .route(
            "/api/v1/assessments/:id/analyze",
            post(handlers::handle_analyze),
        )
        // Direct analysis API (stateless, no persistence)
        .route(
            "/api/v1/analysis/career",
            post(analysis::handle_profile_analysis),
        )
        .route(
            "/api/v1/analysis/personality",
            post(analysis::handle_personality_analysis),
        )
        // Credits API
        .route("/api/v1/credits", get(credits::handle_get_credits))
        .route("/api/v1/credits/grant", post(credits::handle_grant_credits))
        .with_state(state)
}
