use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::features::session::handlers::{self, SessionState};

/// Create routes for the map session feature
pub fn routes(state: SessionState) -> Router {
    Router::new()
        .route("/api/sessions", post(handlers::create_session))
        .route("/api/sessions/{sid}", delete(handlers::close_session))
        .route(
            "/api/sessions/{sid}/markers",
            get(handlers::list_markers).post(handlers::place_marker),
        )
        .route(
            "/api/sessions/{sid}/markers/{mid}",
            delete(handlers::discard_marker),
        )
        .route(
            "/api/sessions/{sid}/markers/{mid}/position",
            patch(handlers::move_marker),
        )
        .route(
            "/api/sessions/{sid}/markers/{mid}/address",
            patch(handlers::edit_marker),
        )
        .route(
            "/api/sessions/{sid}/markers/{mid}/select",
            post(handlers::select_marker),
        )
        .route(
            "/api/sessions/{sid}/markers/{mid}/save",
            post(handlers::save_marker),
        )
        .with_state(state)
}
