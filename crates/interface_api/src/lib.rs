//! HTTP API layer
//!
//! Thin Axum surface over [`domain_policy::PolicyService`]. Handlers hand the
//! request to the service and relay the uniform envelope; the HTTP status is
//! taken from the envelope code (200 on success). Cross-cutting concerns are
//! tower-http layers: request tracing and permissive CORS.

pub mod config;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use domain_policy::PolicyService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PolicyService>,
}

/// Creates the main API router
pub fn create_router(service: Arc<PolicyService>) -> Router {
    let state = AppState { service };

    let policy_routes = Router::new()
        .route(
            "/",
            get(handlers::list_policies).post(handlers::create_policy),
        )
        .route(
            "/:policy_id",
            get(handlers::get_policy)
                .put(handlers::update_policy)
                .delete(handlers::delete_policy),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1/projects/:project/policies", policy_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
