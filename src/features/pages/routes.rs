use axum::{routing::get, Router};

use crate::features::pages::handlers::{self, PagesState};

/// Create routes for the server-rendered pages and client bootstrap
pub fn routes(state: PagesState) -> Router {
    Router::new()
        .route("/", get(handlers::get_home))
        .route("/map", get(handlers::get_map))
        .route("/api/bootstrap", get(handlers::get_bootstrap))
        .with_state(state)
}
