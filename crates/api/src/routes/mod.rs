//! Route table assembly.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub mod health;

/// All `/api/v1` routes. The session middleware is layered on top of
/// this router by [`crate::router::build_app_router`].
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/activities", get(handlers::activities::browse))
        .route(
            "/activities/{activity_id}",
            get(handlers::activities::activity_detail),
        )
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/session", get(handlers::auth::session_info))
}
