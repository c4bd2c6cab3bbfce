use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::dashboard::dtos::{DashboardSummaryDto, RecentQuery};
use crate::features::dashboard::services::DashboardService;
use crate::features::reports::dtos::MarkerResponseDto;
use crate::shared::types::{ApiResponse, Meta};

/// Home page summary stats (public)
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    responses(
        (status = 200, description = "Report counts", body = ApiResponse<DashboardSummaryDto>)
    ),
    tag = "dashboard"
)]
pub async fn get_summary(
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<DashboardSummaryDto>>> {
    let summary = service.get_summary().await?;
    Ok(Json(ApiResponse::success(Some(summary), None, None)))
}

/// Most recent reports (public)
#[utoipa::path(
    get,
    path = "/api/dashboard/recent",
    params(RecentQuery),
    responses(
        (status = 200, description = "Recent reports, newest first", body = ApiResponse<Vec<MarkerResponseDto>>)
    ),
    tag = "dashboard"
)]
pub async fn get_recent(
    State(service): State<Arc<DashboardService>>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<ApiResponse<Vec<MarkerResponseDto>>>> {
    let recent = service.get_recent(query.limit).await?;
    let total = recent.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(recent),
        None,
        Some(Meta { total }),
    )))
}
