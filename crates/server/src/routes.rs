use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::auth::{self, ServerState};

pub mod proposals;
pub mod services;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router. Route order matters within each
/// group: literal segments (`active`, `my-services`) are registered
/// before the `:id` captures.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let service_routes = Router::new()
        .route("/api/services", get(services::list).post(services::create))
        .route("/api/services/active", get(services::list_active))
        .route("/api/services/my-services", get(services::list_mine))
        .route("/api/services/type/:service_type", get(services::list_by_type))
        .route("/api/services/location/:location", get(services::list_by_location))
        .route(
            "/api/services/:id",
            get(services::get_one).put(services::update).delete(services::delete),
        )
        .route("/api/services/:id/cancel", post(services::cancel))
        .route("/api/services/:id/materials", post(services::add_material))
        .route("/api/services/materials/:material_id", axum::routing::delete(services::remove_material));

    let proposal_routes = Router::new()
        .route("/api/proposals/my-proposals", get(proposals::list_mine))
        .route(
            "/api/proposals/service/:service_id",
            get(proposals::list_by_service).post(proposals::create),
        )
        .route("/api/proposals/status/:status_id", get(proposals::list_by_status))
        .route(
            "/api/proposals/:id",
            get(proposals::get_one).put(proposals::update).delete(proposals::delete),
        )
        .route("/api/proposals/:id/accept", post(proposals::accept))
        .route("/api/proposals/:id/reject", post(proposals::reject))
        .route("/api/proposals/:id/complete", post(proposals::complete))
        .route("/api/proposals/:id/evaluate", post(proposals::evaluate));

    Router::new()
        .route("/health", get(health))
        .merge(auth_routes)
        .merge(service_routes)
        .merge(proposal_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
