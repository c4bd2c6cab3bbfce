use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::reports::dtos::{CreateReportDto, MarkerResponseDto, UpdateReportDto};
use crate::features::reports::geofence::{Geofence, LatLng};
use crate::features::reports::models::{MarkerChanges, NewMarker};
use crate::features::reports::services::{MarkerStore, ReverseGeocoder};
use crate::shared::locale;
use crate::shared::types::{ApiResponse, Meta};

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub store: Arc<dyn MarkerStore>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub geofence: Geofence,
}

/// List all reports, newest first
#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "All reports, newest first", body = ApiResponse<Vec<MarkerResponseDto>>)
    ),
    tag = "reports"
)]
pub async fn list_reports(
    State(state): State<ReportState>,
) -> Result<Json<ApiResponse<Vec<MarkerResponseDto>>>> {
    let markers = state.store.fetch_all().await?;
    let total = markers.len() as i64;
    let dtos: Vec<MarkerResponseDto> = markers.into_iter().map(|m| m.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Get a report by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<MarkerResponseDto>),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(state): State<ReportState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MarkerResponseDto>>> {
    let marker = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

    Ok(Json(ApiResponse::success(Some(marker.into()), None, None)))
}

/// Submit a report directly (the non-interactive path)
///
/// The position must lie within the village geofence. When no address is
/// supplied it is reverse-geocoded server-side; a failed lookup falls back
/// to a placeholder string and never blocks the submission.
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 200, description = "Report created", body = ApiResponse<MarkerResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 422, description = "Position outside the village boundary")
    ),
    tag = "reports"
)]
pub async fn create_report(
    State(state): State<ReportState>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<Json<ApiResponse<MarkerResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let point = LatLng::new(dto.lat, dto.lng);
    if !state.geofence.contains(point) {
        return Err(AppError::GeofenceViolation(
            locale::GEOFENCE_REJECTED.to_string(),
        ));
    }

    let address = match dto.address {
        Some(address) => address,
        None => state.geocoder.resolve_address(dto.lat, dto.lng).await,
    };

    let marker = state
        .store
        .create(&NewMarker {
            lat: dto.lat,
            lng: dto.lng,
            address,
            note: dto.note,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        Some(marker.into()),
        Some(locale::REPORT_CREATED.to_string()),
        None,
    )))
}

/// Update a report's address or note
#[utoipa::path(
    patch,
    path = "/api/reports/{id}",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    request_body = UpdateReportDto,
    responses(
        (status = 200, description = "Report updated", body = ApiResponse<MarkerResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn update_report(
    State(state): State<ReportState>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateReportDto>,
) -> Result<Json<ApiResponse<MarkerResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let changes: MarkerChanges = dto.into();
    if changes.is_empty() {
        return Err(AppError::BadRequest(
            "No fields supplied for update".to_string(),
        ));
    }

    let marker = state.store.update(id, &changes).await?;

    Ok(Json(ApiResponse::success(
        Some(marker.into()),
        Some(locale::REPORT_UPDATED.to_string()),
        None,
    )))
}

/// Delete a report
#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report deleted"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn delete_report(
    State(state): State<ReportState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    state.store.delete(id).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some(locale::REPORT_DELETED.to_string()),
        None,
    )))
}
