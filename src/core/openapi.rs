use utoipa::{Modify, OpenApi};

use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::pages::{dtos as pages_dtos, handlers as pages_handlers};
use crate::features::reports::{dtos as reports_dtos, geofence, handlers as reports_handlers};
use crate::features::session::{dtos as session_dtos, handlers as session_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Reports
        reports_handlers::marker_handler::list_reports,
        reports_handlers::marker_handler::get_report,
        reports_handlers::marker_handler::create_report,
        reports_handlers::marker_handler::update_report,
        reports_handlers::marker_handler::delete_report,
        // Map sessions
        session_handlers::session_handler::create_session,
        session_handlers::session_handler::close_session,
        session_handlers::session_handler::list_markers,
        session_handlers::session_handler::place_marker,
        session_handlers::session_handler::move_marker,
        session_handlers::session_handler::edit_marker,
        session_handlers::session_handler::select_marker,
        session_handlers::session_handler::save_marker,
        session_handlers::session_handler::discard_marker,
        // Dashboard (public)
        dashboard_handlers::dashboard_handler::get_summary,
        dashboard_handlers::dashboard_handler::get_recent,
        // Client bootstrap
        pages_handlers::page_handler::get_bootstrap,
    ),
    components(
        schemas(
            // Shared
            Meta,
            geofence::LatLng,
            // Reports
            reports_dtos::CreateReportDto,
            reports_dtos::UpdateReportDto,
            reports_dtos::MarkerResponseDto,
            ApiResponse<reports_dtos::MarkerResponseDto>,
            ApiResponse<Vec<reports_dtos::MarkerResponseDto>>,
            // Map sessions
            session_dtos::SessionCreatedDto,
            session_dtos::PlaceMarkerDto,
            session_dtos::MoveMarkerDto,
            session_dtos::EditMarkerDto,
            session_dtos::SessionMarkerDto,
            session_dtos::SessionBoardDto,
            ApiResponse<session_dtos::SessionCreatedDto>,
            ApiResponse<session_dtos::SessionMarkerDto>,
            ApiResponse<session_dtos::SessionBoardDto>,
            // Dashboard
            dashboard_dtos::DashboardSummaryDto,
            ApiResponse<dashboard_dtos::DashboardSummaryDto>,
            // Client bootstrap
            pages_dtos::ClientBootstrapDto,
            pages_dtos::MessageCatalogDto,
            pages_dtos::GeolocationMessagesDto,
            ApiResponse<pages_dtos::ClientBootstrapDto>,
        )
    ),
    tags(
        (name = "reports", description = "Street-light outage reports"),
        (name = "sessions", description = "Interactive map sessions with the draft marker lifecycle"),
        (name = "dashboard", description = "Public home-page stats"),
        (name = "pages", description = "Client bootstrap configuration"),
    ),
    info(
        title = "Svetnichki API",
        version = "0.1.0",
        description = "Street-light outage reports for Chepintsi village",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
