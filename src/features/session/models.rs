use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::features::reports::geofence::LatLng;
use crate::features::reports::models::Marker;

/// Identity of a marker on the board: a locally generated token until the
/// report is persisted, the server-assigned key afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerId {
    Draft(Uuid),
    Saved(i64),
}

impl MarkerId {
    pub fn new_draft() -> Self {
        Self::Draft(Uuid::new_v4())
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft(_))
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerId::Draft(token) => write!(f, "draft-{}", token),
            MarkerId::Saved(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for MarkerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(token) = s.strip_prefix("draft-") {
            let uuid = Uuid::parse_str(token).map_err(|_| format!("Invalid marker id: {}", s))?;
            return Ok(MarkerId::Draft(uuid));
        }
        s.parse::<i64>()
            .map(MarkerId::Saved)
            .map_err(|_| format!("Invalid marker id: {}", s))
    }
}

/// Lifecycle phase of a marker on the board.
///
/// Drafts cycle `Resolving` -> `Editable` on every position change until
/// they are saved or discarded; `Saved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPhase {
    /// Just placed or moved; address lookup in flight
    Resolving,
    /// Address resolved or user-overridden, awaiting save or discard
    Editable,
    Saved,
}

/// One entry in the session's marker collection. The entry's `address` is
/// also the edit buffer for the active edit target, so position changes and
/// user edits act on a single source of truth.
#[derive(Debug, Clone)]
pub struct SessionMarker {
    pub id: MarkerId,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub phase: MarkerPhase,
}

impl SessionMarker {
    pub fn is_saved(&self) -> bool {
        matches!(self.phase, MarkerPhase::Saved)
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

impl From<Marker> for SessionMarker {
    fn from(m: Marker) -> Self {
        Self {
            id: MarkerId::Saved(m.id),
            lat: m.lat,
            lng: m.lng,
            address: m.address,
            note: m.note,
            created_at: m.inserted_at,
            phase: MarkerPhase::Saved,
        }
    }
}

/// Token for one pending address resolution.
///
/// Every placement or move mints a job carrying the marker's current
/// resolution generation; the result is applied only if that generation is
/// still current, which makes stale responses observable and droppable
/// instead of silently last-to-arrive-wins.
#[derive(Debug, Clone)]
pub struct ResolveJob {
    pub marker_id: MarkerId,
    pub generation: u64,
    pub lat: f64,
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_id_display_round_trip() {
        let draft = MarkerId::new_draft();
        assert_eq!(draft.to_string().parse::<MarkerId>().unwrap(), draft);

        let saved = MarkerId::Saved(42);
        assert_eq!(saved.to_string(), "42");
        assert_eq!("42".parse::<MarkerId>().unwrap(), saved);
    }

    #[test]
    fn test_marker_id_rejects_garbage() {
        assert!("draft-not-a-uuid".parse::<MarkerId>().is_err());
        assert!("abc".parse::<MarkerId>().is_err());
    }
}
