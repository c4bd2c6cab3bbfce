use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::reports::models::{Marker, MarkerChanges};

/// Request DTO for submitting a report directly
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportDto {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub lng: f64,

    /// Optional address override; resolved from the coordinates when absent
    #[validate(length(min = 1, max = 500, message = "Address must be 1-500 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 2000, message = "Note must not exceed 2000 characters"))]
    pub note: Option<String>,
}

/// Request DTO for updating a report's annotations. Position is immutable
/// once a report is saved, so coordinates are not accepted here.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportDto {
    #[validate(length(min = 1, max = 500, message = "Address must be 1-500 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 2000, message = "Note must not exceed 2000 characters"))]
    pub note: Option<String>,
}

impl From<UpdateReportDto> for MarkerChanges {
    fn from(dto: UpdateReportDto) -> Self {
        Self {
            address: dto.address,
            note: dto.note,
        }
    }
}

/// Response DTO for a persisted report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkerResponseDto {
    pub id: i64,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Marker> for MarkerResponseDto {
    fn from(m: Marker) -> Self {
        Self {
            id: m.id,
            lat: m.lat,
            lng: m.lng,
            address: m.address,
            note: m.note,
            created_at: m.inserted_at,
        }
    }
}
