use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted street-light outage report, as stored in the `reports` table.
///
/// Serde derives double for the legacy file store, which keeps the same row
/// shape on disk.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Marker {
    pub id: i64,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub note: Option<String>,
    pub inserted_at: DateTime<Utc>,
}

/// Data for inserting a new report row
#[derive(Debug, Clone)]
pub struct NewMarker {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub note: Option<String>,
}

/// Partial update of a persisted report. Position is immutable once saved,
/// so only the annotation fields can change.
#[derive(Debug, Clone, Default)]
pub struct MarkerChanges {
    pub address: Option<String>,
    pub note: Option<String>,
}

impl MarkerChanges {
    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.note.is_none()
    }
}
