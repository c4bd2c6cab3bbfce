use std::sync::Arc;

use axum::{extract::State, response::Html, Json};
use minijinja::{context, Value};

use crate::core::error::{AppError, Result};
use crate::features::dashboard::services::DashboardService;
use crate::features::pages::dtos::ClientBootstrapDto;
use crate::features::pages::engine;
use crate::shared::constants::DEFAULT_RECENT_LIMIT;
use crate::shared::types::ApiResponse;

/// State for page handlers
#[derive(Clone)]
pub struct PagesState {
    pub dashboard: Arc<DashboardService>,
    pub bootstrap: ClientBootstrapDto,
}

/// Home page: header stats and the recent report list
pub async fn get_home(State(state): State<PagesState>) -> Result<Html<String>> {
    let summary = state.dashboard.get_summary().await?;
    let recent = state.dashboard.get_recent(DEFAULT_RECENT_LIMIT).await?;

    let html = engine::render_page(
        "home.html.jinja",
        context! {
            summary => Value::from_serialize(&summary),
            recent => Value::from_serialize(&recent),
        },
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Html(html))
}

/// Map page shell; the map itself boots from `/api/bootstrap`
pub async fn get_map(State(state): State<PagesState>) -> Result<Html<String>> {
    let html = engine::render_page(
        "map.html.jinja",
        context! {
            bootstrap => Value::from_serialize(&state.bootstrap),
        },
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Html(html))
}

/// Client bootstrap configuration (public)
#[utoipa::path(
    get,
    path = "/api/bootstrap",
    responses(
        (status = 200, description = "Map configuration and message catalog", body = ApiResponse<ClientBootstrapDto>)
    ),
    tag = "pages"
)]
pub async fn get_bootstrap(
    State(state): State<PagesState>,
) -> Result<Json<ApiResponse<ClientBootstrapDto>>> {
    Ok(Json(ApiResponse::success(
        Some(state.bootstrap.clone()),
        None,
        None,
    )))
}
