pub mod application_routes;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::{auth, rate_limit};
use crate::AppState;

pub fn app_router(state: AppState, config: &Config) -> Router {
    let public_api = Router::new()
        .route(
            "/api/public/applications",
            post(application_routes::submit_application),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new("public", config.public_rps),
            rate_limit::rps_middleware,
        ));

    let staff_api = Router::new()
        .route(
            "/api/applications",
            get(application_routes::list_applications),
        )
        .route(
            "/api/applications/pending",
            get(application_routes::pending_applications),
        )
        .route(
            "/api/applications/:id",
            get(application_routes::get_application),
        )
        .route(
            "/api/applications/:id/transitions",
            get(application_routes::allowed_transitions),
        )
        .route(
            "/api/applications/:id/status",
            post(application_routes::update_application_status),
        )
        .layer(axum::middleware::from_fn(auth::require_staff))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new("staff", config.api_rps),
            rate_limit::rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(public_api)
        .merge(staff_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
