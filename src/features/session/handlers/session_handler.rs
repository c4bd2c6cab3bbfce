use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::reports::geofence::{Geofence, LatLng};
use crate::features::reports::services::{MarkerStore, ReverseGeocoder};
use crate::features::session::dtos::{
    EditMarkerDto, MoveMarkerDto, PlaceMarkerDto, SessionBoardDto, SessionCreatedDto,
    SessionMarkerDto,
};
use crate::features::session::models::{MarkerId, ResolveJob};
use crate::features::session::registry::SessionRegistry;
use crate::features::session::session::MarkerSession;
use crate::shared::types::ApiResponse;

/// State for session handlers
#[derive(Clone)]
pub struct SessionState {
    pub registry: Arc<SessionRegistry>,
    pub store: Arc<dyn MarkerStore>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub geofence: Geofence,
}

/// Run a resolution job in the background and feed the result back through
/// the session's generation guard. Superseded results are simply dropped.
fn spawn_resolution(state: &SessionState, session_id: Uuid, job: ResolveJob) {
    let registry = Arc::clone(&state.registry);
    let geocoder = Arc::clone(&state.geocoder);

    tokio::spawn(async move {
        let address = geocoder.resolve_address(job.lat, job.lng).await;

        let Some(session) = registry.get(&session_id).await else {
            return;
        };
        let mut session = session.lock().await;
        if !session.apply_resolved_address(&job, address) {
            tracing::debug!(
                "Dropped stale address resolution for marker {}",
                job.marker_id
            );
        }
    });
}

async fn lookup_session(
    state: &SessionState,
    session_id: &Uuid,
) -> Result<Arc<tokio::sync::Mutex<MarkerSession>>> {
    state
        .registry
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found or expired", session_id)))
}

fn parse_marker_id(raw: &str) -> Result<MarkerId> {
    raw.parse().map_err(AppError::BadRequest)
}

/// Open a map session
///
/// The board is hydrated with all persisted reports so the client starts
/// from the current map state.
#[utoipa::path(
    post,
    path = "/api/sessions",
    responses(
        (status = 200, description = "Session created", body = ApiResponse<SessionCreatedDto>)
    ),
    tag = "sessions"
)]
pub async fn create_session(
    State(state): State<SessionState>,
) -> Result<Json<ApiResponse<SessionCreatedDto>>> {
    let persisted = state.store.fetch_all().await?;

    let mut session = MarkerSession::new(state.geofence);
    session.load_persisted(persisted);
    let marker_count = session.markers().len();

    let session_id = state.registry.insert(session).await;

    Ok(Json(ApiResponse::success(
        Some(SessionCreatedDto {
            session_id,
            marker_count,
        }),
        None,
        None,
    )))
}

/// Close a map session
#[utoipa::path(
    delete,
    path = "/api/sessions/{sid}",
    params(
        ("sid" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session closed"),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn close_session(
    State(state): State<SessionState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    if !state.registry.remove(&sid).await {
        return Err(AppError::NotFound(format!(
            "Session {} not found or expired",
            sid
        )));
    }
    Ok(Json(ApiResponse::success(None, None, None)))
}

/// List the session's markers and active edit target
#[utoipa::path(
    get,
    path = "/api/sessions/{sid}/markers",
    params(
        ("sid" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session board", body = ApiResponse<SessionBoardDto>),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn list_markers(
    State(state): State<SessionState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionBoardDto>>> {
    let session = lookup_session(&state, &sid).await?;
    let session = session.lock().await;

    let board = SessionBoardDto {
        markers: session.markers().iter().map(SessionMarkerDto::from).collect(),
        active_edit_id: session.active_edit_id().map(|id| id.to_string()),
    };

    Ok(Json(ApiResponse::success(Some(board), None, None)))
}

/// Drop a pin on the map
///
/// Rejected with 422 when the point lies outside the village boundary; no
/// draft is created in that case. Otherwise the new draft becomes the
/// active edit target and its address resolution starts in the background.
#[utoipa::path(
    post,
    path = "/api/sessions/{sid}/markers",
    params(
        ("sid" = Uuid, Path, description = "Session ID")
    ),
    request_body = PlaceMarkerDto,
    responses(
        (status = 200, description = "Draft placed", body = ApiResponse<SessionMarkerDto>),
        (status = 404, description = "Session not found"),
        (status = 422, description = "Position outside the village boundary")
    ),
    tag = "sessions"
)]
pub async fn place_marker(
    State(state): State<SessionState>,
    Path(sid): Path<Uuid>,
    AppJson(dto): AppJson<PlaceMarkerDto>,
) -> Result<Json<ApiResponse<SessionMarkerDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = lookup_session(&state, &sid).await?;
    let (marker, job) = {
        let mut session = session.lock().await;
        session.place_marker(LatLng::new(dto.lat, dto.lng), dto.note)?
    };

    spawn_resolution(&state, sid, job);

    Ok(Json(ApiResponse::success(
        Some(SessionMarkerDto::from(&marker)),
        None,
        None,
    )))
}

/// Drag a draft to a new position
///
/// The address resets to the loading placeholder and a fresh resolution is
/// issued; a still-running lookup for the old position is superseded.
#[utoipa::path(
    patch,
    path = "/api/sessions/{sid}/markers/{mid}/position",
    params(
        ("sid" = Uuid, Path, description = "Session ID"),
        ("mid" = String, Path, description = "Marker ID")
    ),
    request_body = MoveMarkerDto,
    responses(
        (status = 200, description = "Draft moved", body = ApiResponse<SessionMarkerDto>),
        (status = 404, description = "Session or marker not found"),
        (status = 409, description = "Marker already saved")
    ),
    tag = "sessions"
)]
pub async fn move_marker(
    State(state): State<SessionState>,
    Path((sid, mid)): Path<(Uuid, String)>,
    AppJson(dto): AppJson<MoveMarkerDto>,
) -> Result<Json<ApiResponse<SessionMarkerDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let marker_id = parse_marker_id(&mid)?;

    let session = lookup_session(&state, &sid).await?;
    let (marker, job) = {
        let mut session = session.lock().await;
        let job = session.moved_marker(&marker_id, LatLng::new(dto.lat, dto.lng))?;
        let marker = session
            .marker(&marker_id)
            .ok_or_else(|| AppError::Internal("Marker vanished while moving".to_string()))?
            .clone();
        (marker, job)
    };

    spawn_resolution(&state, sid, job);

    Ok(Json(ApiResponse::success(
        Some(SessionMarkerDto::from(&marker)),
        None,
        None,
    )))
}

/// Edit the active draft's address or note
///
/// Overwrites the buffered text without re-triggering geocoding.
#[utoipa::path(
    patch,
    path = "/api/sessions/{sid}/markers/{mid}/address",
    params(
        ("sid" = Uuid, Path, description = "Session ID"),
        ("mid" = String, Path, description = "Marker ID")
    ),
    request_body = EditMarkerDto,
    responses(
        (status = 200, description = "Draft updated", body = ApiResponse<SessionMarkerDto>),
        (status = 400, description = "Marker is not the active edit target"),
        (status = 404, description = "Session or marker not found"),
        (status = 409, description = "Marker already saved")
    ),
    tag = "sessions"
)]
pub async fn edit_marker(
    State(state): State<SessionState>,
    Path((sid, mid)): Path<(Uuid, String)>,
    AppJson(dto): AppJson<EditMarkerDto>,
) -> Result<Json<ApiResponse<SessionMarkerDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if dto.address.is_none() && dto.note.is_none() {
        return Err(AppError::BadRequest(
            "No fields supplied for update".to_string(),
        ));
    }
    let marker_id = parse_marker_id(&mid)?;

    let session = lookup_session(&state, &sid).await?;
    let mut session = session.lock().await;

    if let Some(address) = &dto.address {
        session.edit_address(&marker_id, address)?;
    }
    if let Some(note) = dto.note {
        session.edit_note(&marker_id, Some(note))?;
    }

    let marker = session
        .marker(&marker_id)
        .ok_or_else(|| AppError::Internal("Marker vanished while editing".to_string()))?;

    Ok(Json(ApiResponse::success(
        Some(SessionMarkerDto::from(marker)),
        None,
        None,
    )))
}

/// Make a draft the active edit target
#[utoipa::path(
    post,
    path = "/api/sessions/{sid}/markers/{mid}/select",
    params(
        ("sid" = Uuid, Path, description = "Session ID"),
        ("mid" = String, Path, description = "Marker ID")
    ),
    responses(
        (status = 200, description = "Marker selected", body = ApiResponse<SessionBoardDto>),
        (status = 404, description = "Session or marker not found"),
        (status = 409, description = "Marker already saved")
    ),
    tag = "sessions"
)]
pub async fn select_marker(
    State(state): State<SessionState>,
    Path((sid, mid)): Path<(Uuid, String)>,
) -> Result<Json<ApiResponse<SessionBoardDto>>> {
    let marker_id = parse_marker_id(&mid)?;

    let session = lookup_session(&state, &sid).await?;
    let mut session = session.lock().await;
    session.select_for_edit(&marker_id)?;

    let board = SessionBoardDto {
        markers: session.markers().iter().map(SessionMarkerDto::from).collect(),
        active_edit_id: session.active_edit_id().map(|id| id.to_string()),
    };

    Ok(Json(ApiResponse::success(Some(board), None, None)))
}

/// Persist a draft
///
/// The geofence is re-validated first (the draft may have been dragged
/// since placement). On success the draft's temporary id is replaced by the
/// server-assigned one and the active edit target is cleared.
#[utoipa::path(
    post,
    path = "/api/sessions/{sid}/markers/{mid}/save",
    params(
        ("sid" = Uuid, Path, description = "Session ID"),
        ("mid" = String, Path, description = "Marker ID")
    ),
    responses(
        (status = 200, description = "Draft persisted", body = ApiResponse<SessionMarkerDto>),
        (status = 404, description = "Session or marker not found"),
        (status = 409, description = "Marker already saved"),
        (status = 422, description = "Draft dragged outside the village boundary")
    ),
    tag = "sessions"
)]
pub async fn save_marker(
    State(state): State<SessionState>,
    Path((sid, mid)): Path<(Uuid, String)>,
) -> Result<Json<ApiResponse<SessionMarkerDto>>> {
    let marker_id = parse_marker_id(&mid)?;

    let session = lookup_session(&state, &sid).await?;
    let mut session = session.lock().await;
    let saved = session.save(&marker_id, state.store.as_ref()).await?;

    Ok(Json(ApiResponse::success(
        Some(SessionMarkerDto::from(&saved)),
        None,
        None,
    )))
}

/// Remove a marker
///
/// Drafts disappear locally with no backend call; persisted markers are
/// deleted remotely first and stay on the board if that fails.
#[utoipa::path(
    delete,
    path = "/api/sessions/{sid}/markers/{mid}",
    params(
        ("sid" = Uuid, Path, description = "Session ID"),
        ("mid" = String, Path, description = "Marker ID")
    ),
    responses(
        (status = 200, description = "Marker removed"),
        (status = 404, description = "Session or marker not found")
    ),
    tag = "sessions"
)]
pub async fn discard_marker(
    State(state): State<SessionState>,
    Path((sid, mid)): Path<(Uuid, String)>,
) -> Result<Json<ApiResponse<()>>> {
    let marker_id = parse_marker_id(&mid)?;

    let session = lookup_session(&state, &sid).await?;
    let mut session = session.lock().await;
    session.discard(&marker_id, state.store.as_ref()).await?;

    Ok(Json(ApiResponse::success(None, None, None)))
}
