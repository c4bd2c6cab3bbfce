use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::session::models::SessionMarker;

/// Response DTO for a freshly created map session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreatedDto {
    pub session_id: Uuid,
    pub marker_count: usize,
}

/// Request DTO for dropping a pin
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceMarkerDto {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub lng: f64,

    #[validate(length(max = 2000, message = "Note must not exceed 2000 characters"))]
    pub note: Option<String>,
}

/// Request DTO for dragging a draft to a new position
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveMarkerDto {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub lng: f64,
}

/// Request DTO for editing the active draft's address or note
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditMarkerDto {
    #[validate(length(min = 1, max = 500, message = "Address must be 1-500 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 2000, message = "Note must not exceed 2000 characters"))]
    pub note: Option<String>,
}

/// Response DTO for one marker on the session board
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionMarkerDto {
    /// Draft token (`draft-<uuid>`) or server-assigned numeric id
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_saved: bool,
}

impl From<&SessionMarker> for SessionMarkerDto {
    fn from(m: &SessionMarker) -> Self {
        Self {
            id: m.id.to_string(),
            lat: m.lat,
            lng: m.lng,
            address: m.address.clone(),
            note: m.note.clone(),
            created_at: m.created_at,
            is_saved: m.is_saved(),
        }
    }
}

/// Response DTO for the whole session board
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionBoardDto {
    pub markers: Vec<SessionMarkerDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_edit_id: Option<String>,
}
