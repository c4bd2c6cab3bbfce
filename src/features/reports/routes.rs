use axum::{routing::get, Router};

use crate::features::reports::handlers::{self, ReportState};

/// Create routes for the reports feature
///
/// All routes are public; reports are submitted and browsed anonymously.
pub fn routes(state: ReportState) -> Router {
    Router::new()
        .route(
            "/api/reports",
            get(handlers::list_reports).post(handlers::create_report),
        )
        .route(
            "/api/reports/{id}",
            get(handlers::get_report)
                .patch(handlers::update_report)
                .delete(handlers::delete_report),
        )
        .with_state(state)
}
