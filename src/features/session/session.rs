use std::collections::HashMap;

use chrono::Utc;

use crate::core::error::{AppError, Result};
use crate::features::reports::geofence::{Geofence, LatLng};
use crate::features::reports::models::{Marker, NewMarker};
use crate::features::reports::services::MarkerStore;
use crate::features::session::models::{MarkerId, MarkerPhase, ResolveJob, SessionMarker};
use crate::shared::locale;

/// The marker board for one map session.
///
/// Owns the in-memory marker collection, the single active-edit pointer and
/// the per-marker address-resolution generations. All mutation goes through
/// the operations below; callers serialize access with an async mutex, so
/// the board itself needs no locking.
///
/// Address resolution is asynchronous: placement and moves return a
/// [`ResolveJob`] that the caller runs against a geocoder, feeding the
/// result back through [`MarkerSession::apply_resolved_address`]. Jobs whose
/// generation has been superseded are ignored there, which makes resolution
/// last-issued-wins per marker regardless of arrival order.
pub struct MarkerSession {
    geofence: Geofence,
    markers: Vec<SessionMarker>,
    active_edit: Option<MarkerId>,
    generations: HashMap<MarkerId, u64>,
}

impl MarkerSession {
    pub fn new(geofence: Geofence) -> Self {
        Self {
            geofence,
            markers: Vec::new(),
            active_edit: None,
            generations: HashMap::new(),
        }
    }

    pub fn markers(&self) -> &[SessionMarker] {
        &self.markers
    }

    pub fn active_edit_id(&self) -> Option<&MarkerId> {
        self.active_edit.as_ref()
    }

    pub fn marker(&self, id: &MarkerId) -> Option<&SessionMarker> {
        self.markers.iter().find(|m| &m.id == id)
    }

    /// Hydrate the board with persisted reports at session start.
    pub fn load_persisted(&mut self, records: Vec<Marker>) {
        self.markers.extend(records.into_iter().map(SessionMarker::from));
    }

    /// Drop a new pin.
    ///
    /// Rejected before anything else happens if the point is outside the
    /// village boundary. Otherwise a draft is added, made the active edit
    /// target, and its first resolution job is returned.
    pub fn place_marker(
        &mut self,
        point: LatLng,
        note: Option<String>,
    ) -> Result<(SessionMarker, ResolveJob)> {
        if !self.geofence.contains(point) {
            tracing::debug!(
                "Rejected placement at ({}, {}): {:.3} km from center",
                point.lat,
                point.lng,
                self.geofence.distance_from_center_km(point)
            );
            return Err(AppError::GeofenceViolation(
                locale::GEOFENCE_REJECTED.to_string(),
            ));
        }

        let id = MarkerId::new_draft();
        let marker = SessionMarker {
            id: id.clone(),
            lat: point.lat,
            lng: point.lng,
            address: locale::ADDRESS_RESOLVING.to_string(),
            note,
            created_at: Utc::now(),
            phase: MarkerPhase::Resolving,
        };

        self.markers.push(marker.clone());
        self.active_edit = Some(id.clone());
        let generation = self.bump_generation(&id);

        tracing::debug!("Placed draft {} at ({}, {})", id, point.lat, point.lng);

        let job = ResolveJob {
            marker_id: id,
            generation,
            lat: point.lat,
            lng: point.lng,
        };
        Ok((marker, job))
    }

    /// Move a draft to a new position.
    ///
    /// The address falls back to the loading placeholder and a fresh
    /// resolution job is issued; any in-flight job for the marker is
    /// superseded.
    pub fn moved_marker(&mut self, id: &MarkerId, point: LatLng) -> Result<ResolveJob> {
        let marker = self.draft_mut(id)?;
        marker.lat = point.lat;
        marker.lng = point.lng;
        marker.address = locale::ADDRESS_RESOLVING.to_string();
        marker.phase = MarkerPhase::Resolving;

        let generation = self.bump_generation(id);
        Ok(ResolveJob {
            marker_id: id.clone(),
            generation,
            lat: point.lat,
            lng: point.lng,
        })
    }

    /// Overwrite the buffered address of the active edit target.
    ///
    /// Does not re-trigger geocoding; on the contrary, it supersedes any
    /// lookup still in flight so the user's text cannot be clobbered by a
    /// late response.
    pub fn edit_address(&mut self, id: &MarkerId, text: &str) -> Result<()> {
        self.ensure_active_target(id)?;
        let marker = self.draft_mut(id)?;
        marker.address = text.to_string();
        marker.phase = MarkerPhase::Editable;
        self.bump_generation(id);
        Ok(())
    }

    /// Set or replace the note of the active edit target.
    pub fn edit_note(&mut self, id: &MarkerId, note: Option<String>) -> Result<()> {
        self.ensure_active_target(id)?;
        let marker = self.draft_mut(id)?;
        marker.note = note;
        Ok(())
    }

    /// Apply the result of a resolution job.
    ///
    /// Returns `false` (and leaves the board untouched) when the marker has
    /// been discarded or saved in the meantime, or when the job's generation
    /// was superseded by a later move or user edit.
    pub fn apply_resolved_address(&mut self, job: &ResolveJob, address: String) -> bool {
        let current = self.generations.get(&job.marker_id).copied();
        if current != Some(job.generation) {
            return false;
        }

        let Some(marker) = self.markers.iter_mut().find(|m| m.id == job.marker_id) else {
            return false;
        };
        if marker.is_saved() {
            return false;
        }

        marker.address = address;
        marker.phase = MarkerPhase::Editable;
        true
    }

    /// Make a draft the active edit target.
    pub fn select_for_edit(&mut self, id: &MarkerId) -> Result<()> {
        let marker = self
            .marker(id)
            .ok_or_else(|| AppError::NotFound(format!("Marker {} not found", id)))?;
        if marker.is_saved() {
            return Err(AppError::Conflict(
                "Saved reports cannot be edited".to_string(),
            ));
        }
        self.active_edit = Some(id.clone());
        Ok(())
    }

    /// Persist a draft.
    ///
    /// The geofence is re-validated first: the draft may have been dragged
    /// since placement. On violation the draft stays editable and the store
    /// is not called. On store failure the draft is left unchanged so the
    /// user can retry the same action.
    pub async fn save(&mut self, id: &MarkerId, store: &dyn MarkerStore) -> Result<SessionMarker> {
        let geofence = self.geofence;
        let marker = self.draft_mut(id)?;

        if !geofence.contains(marker.position()) {
            return Err(AppError::GeofenceViolation(
                locale::GEOFENCE_REJECTED_ON_SAVE.to_string(),
            ));
        }

        let data = NewMarker {
            lat: marker.lat,
            lng: marker.lng,
            address: marker.address.clone(),
            note: marker.note.clone(),
        };

        let persisted = store.create(&data).await?;

        // Replace the draft in place with the persisted record: the
        // temporary id gives way to the server-assigned one. The exclusive
        // borrow is held across the await, so the draft is still here.
        let marker = self.draft_mut(id)?;
        let draft_id = std::mem::replace(&mut marker.id, MarkerId::Saved(persisted.id));
        marker.address = persisted.address;
        marker.created_at = persisted.inserted_at;
        marker.note = persisted.note;
        marker.phase = MarkerPhase::Saved;
        let saved = marker.clone();

        self.generations.remove(&draft_id);
        if self.active_edit.as_ref() == Some(&draft_id) {
            self.active_edit = None;
        }

        tracing::debug!("Saved draft {} as report {}", draft_id, persisted.id);
        Ok(saved)
    }

    /// Remove a marker from the board.
    ///
    /// Drafts vanish locally with no backend call. Persisted markers are
    /// deleted remotely first and stay on the board if that fails.
    pub async fn discard(&mut self, id: &MarkerId, store: &dyn MarkerStore) -> Result<()> {
        let marker = self
            .marker(id)
            .ok_or_else(|| AppError::NotFound(format!("Marker {} not found", id)))?;

        if let MarkerId::Saved(record_id) = marker.id {
            store.delete(record_id).await?;
        }

        self.markers.retain(|m| &m.id != id);
        self.generations.remove(id);
        if self.active_edit.as_ref() == Some(id) {
            self.active_edit = None;
        }

        tracing::debug!("Discarded marker {}", id);
        Ok(())
    }

    fn bump_generation(&mut self, id: &MarkerId) -> u64 {
        let generation = self.generations.entry(id.clone()).or_insert(0);
        *generation += 1;
        *generation
    }

    fn ensure_active_target(&self, id: &MarkerId) -> Result<()> {
        if self.active_edit.as_ref() != Some(id) {
            return Err(AppError::BadRequest(
                "Marker is not the active edit target".to_string(),
            ));
        }
        Ok(())
    }

    fn draft_mut(&mut self, id: &MarkerId) -> Result<&mut SessionMarker> {
        let marker = self
            .markers
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Marker {} not found", id)))?;
        if marker.is_saved() {
            return Err(AppError::Conflict(
                "Saved reports cannot be modified".to_string(),
            ));
        }
        Ok(marker)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::shared::constants::{DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG};
    use crate::shared::test_helpers::MemoryMarkerStore;

    fn center() -> LatLng {
        LatLng::new(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG)
    }

    fn session() -> MarkerSession {
        MarkerSession::new(Geofence::new(center(), 1.5))
    }

    /// ~2 km north of center, outside the 1.5 km fence
    fn outside_point() -> LatLng {
        LatLng::new(DEFAULT_CENTER_LAT + 0.018, DEFAULT_CENTER_LNG)
    }

    /// Inside the fence but away from center
    fn nearby_point() -> LatLng {
        LatLng::new(DEFAULT_CENTER_LAT + 0.005, DEFAULT_CENTER_LNG)
    }

    #[test]
    fn test_place_marker_creates_resolving_draft() {
        let mut session = session();
        let (marker, job) = session.place_marker(center(), None).unwrap();

        assert!(marker.id.is_draft());
        assert_eq!(marker.phase, MarkerPhase::Resolving);
        assert_eq!(marker.address, locale::ADDRESS_RESOLVING);
        assert_eq!(job.generation, 1);
        assert_eq!(session.active_edit_id(), Some(&marker.id));
        assert_eq!(session.markers().len(), 1);
    }

    #[test]
    fn test_place_marker_outside_fence_adds_nothing() {
        let mut session = session();
        let err = session.place_marker(outside_point(), None).unwrap_err();

        assert!(matches!(err, AppError::GeofenceViolation(_)));
        assert!(session.markers().is_empty());
        assert!(session.active_edit_id().is_none());
    }

    #[test]
    fn test_boundary_placement_is_admitted() {
        let point = nearby_point();
        let radius = crate::features::reports::geofence::distance_km(center(), point);
        let mut session = MarkerSession::new(Geofence::new(center(), radius));

        assert!(session.place_marker(point, None).is_ok());
    }

    #[test]
    fn test_move_resets_address_and_issues_one_new_job() {
        let mut session = session();
        let (marker, first_job) = session.place_marker(center(), None).unwrap();

        assert!(session.apply_resolved_address(&first_job, "ул. Софийска".to_string()));
        assert_eq!(session.marker(&marker.id).unwrap().phase, MarkerPhase::Editable);

        let second_job = session.moved_marker(&marker.id, nearby_point()).unwrap();

        let moved = session.marker(&marker.id).unwrap();
        assert_eq!(moved.address, locale::ADDRESS_RESOLVING);
        assert_eq!(moved.phase, MarkerPhase::Resolving);
        assert_eq!(second_job.generation, first_job.generation + 1);
    }

    #[test]
    fn test_stale_resolution_is_discarded() {
        let mut session = session();
        let (marker, first_job) = session.place_marker(center(), None).unwrap();
        let second_job = session.moved_marker(&marker.id, nearby_point()).unwrap();

        // The second request resolves first; the first arrives late.
        assert!(session.apply_resolved_address(&second_job, "нов адрес".to_string()));
        assert!(!session.apply_resolved_address(&first_job, "стар адрес".to_string()));

        assert_eq!(session.marker(&marker.id).unwrap().address, "нов адрес");
    }

    #[test]
    fn test_last_issued_wins_even_when_applied_in_order() {
        let mut session = session();
        let (marker, first_job) = session.place_marker(center(), None).unwrap();
        let second_job = session.moved_marker(&marker.id, nearby_point()).unwrap();

        // In-order arrival: the superseded first job must still be dropped.
        assert!(!session.apply_resolved_address(&first_job, "стар адрес".to_string()));
        assert!(session.apply_resolved_address(&second_job, "нов адрес".to_string()));

        assert_eq!(session.marker(&marker.id).unwrap().address, "нов адрес");
    }

    #[test]
    fn test_user_edit_supersedes_in_flight_resolution() {
        let mut session = session();
        let (marker, job) = session.place_marker(center(), None).unwrap();

        session.edit_address(&marker.id, "Главна улица 5").unwrap();
        assert!(!session.apply_resolved_address(&job, "ул. Софийска".to_string()));

        assert_eq!(session.marker(&marker.id).unwrap().address, "Главна улица 5");
    }

    #[test]
    fn test_edit_address_requires_active_target() {
        let mut session = session();
        let (first, _) = session.place_marker(center(), None).unwrap();
        let (_second, _) = session.place_marker(nearby_point(), None).unwrap();

        // The second placement took over the active-edit pointer
        let err = session.edit_address(&first.id, "адрес").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        session.select_for_edit(&first.id).unwrap();
        assert!(session.edit_address(&first.id, "адрес").is_ok());
    }

    #[tokio::test]
    async fn test_save_replaces_draft_with_persisted_record() {
        let store = Arc::new(MemoryMarkerStore::new());
        let mut session = session();

        let (marker, job) = session.place_marker(center(), None).unwrap();
        session.apply_resolved_address(&job, "ул. Софийска".to_string());
        session.edit_address(&marker.id, "Главна улица 5").unwrap();

        let saved = session.save(&marker.id, store.as_ref()).await.unwrap();

        assert!(saved.is_saved());
        assert_eq!(saved.address, "Главна улица 5");
        assert_eq!(saved.lat, center().lat);
        assert_eq!(saved.lng, center().lng);
        assert!(matches!(saved.id, MarkerId::Saved(_)));
        assert!(session.active_edit_id().is_none());

        // The draft entry was replaced, not duplicated
        assert_eq!(session.markers().len(), 1);

        // Round-trip through the store
        let all = store.fetch_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].address, "Главна улица 5");
        assert_eq!(all[0].lat, center().lat);
    }

    #[tokio::test]
    async fn test_save_rejects_draft_dragged_out_of_bounds() {
        let store = Arc::new(MemoryMarkerStore::new());
        let mut session = session();
        let (marker, _) = session.place_marker(center(), None).unwrap();
        session.moved_marker(&marker.id, outside_point()).unwrap();
        session.edit_address(&marker.id, "временен адрес").unwrap();

        let err = session.save(&marker.id, store.as_ref()).await.unwrap_err();
        assert!(matches!(err, AppError::GeofenceViolation(_)));

        // No store call, draft still present and editable
        assert_eq!(store.create_calls(), 0);
        let draft = session.marker(&marker.id).unwrap();
        assert!(!draft.is_saved());
        assert_eq!(draft.address, "временен адрес");
    }

    #[tokio::test]
    async fn test_save_failure_leaves_draft_untouched() {
        let store = Arc::new(MemoryMarkerStore::new());
        store.set_fail_creates(true);

        let mut session = session();
        let (marker, job) = session.place_marker(center(), None).unwrap();
        session.apply_resolved_address(&job, "ул. Софийска".to_string());

        let err = session.save(&marker.id, store.as_ref()).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        let draft = session.marker(&marker.id).unwrap();
        assert!(!draft.is_saved());
        assert_eq!(draft.address, "ул. Софийска");
        assert_eq!(session.active_edit_id(), Some(&marker.id));

        // The action is retryable as-is
        store.set_fail_creates(false);
        assert!(session.save(&marker.id, store.as_ref()).await.is_ok());
    }

    #[tokio::test]
    async fn test_discard_draft_never_calls_store() {
        let store = Arc::new(MemoryMarkerStore::new());
        let mut session = session();
        let (marker, _) = session.place_marker(center(), None).unwrap();

        session.discard(&marker.id, store.as_ref()).await.unwrap();

        assert!(session.markers().is_empty());
        assert!(session.active_edit_id().is_none());
        assert_eq!(store.delete_calls(), 0);
    }

    #[tokio::test]
    async fn test_discard_persisted_deletes_remotely_first() {
        let store = Arc::new(MemoryMarkerStore::new());
        let mut session = session();
        let (marker, _) = session.place_marker(center(), None).unwrap();
        let saved = session.save(&marker.id, store.as_ref()).await.unwrap();

        store.set_fail_deletes(true);
        let err = session.discard(&saved.id, store.as_ref()).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        // Still on the board after the failed remote delete
        assert_eq!(session.markers().len(), 1);
        assert_eq!(store.delete_calls(), 1);

        store.set_fail_deletes(false);
        session.discard(&saved.id, store.as_ref()).await.unwrap();
        assert!(session.markers().is_empty());
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_saved_markers_cannot_be_moved_or_edited() {
        let store = Arc::new(MemoryMarkerStore::new());
        let mut session = session();
        let (marker, _) = session.place_marker(center(), None).unwrap();
        let saved = session.save(&marker.id, store.as_ref()).await.unwrap();

        assert!(matches!(
            session.moved_marker(&saved.id, nearby_point()),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            session.select_for_edit(&saved.id),
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_resolution_after_save_is_ignored() {
        let store = Arc::new(MemoryMarkerStore::new());
        let mut session = session();
        let (marker, job) = session.place_marker(center(), None).unwrap();
        session.save(&marker.id, store.as_ref()).await.unwrap();

        assert!(!session.apply_resolved_address(&job, "закъснял адрес".to_string()));
    }

    #[test]
    fn test_resolution_after_discard_is_ignored() {
        let mut session = session();
        let (marker, job) = session.place_marker(center(), None).unwrap();
        session.markers.retain(|m| m.id != marker.id);
        session.generations.remove(&marker.id);

        assert!(!session.apply_resolved_address(&job, "адрес".to_string()));
    }

    #[test]
    fn test_load_persisted_hydrates_saved_markers() {
        let mut session = session();
        session.load_persisted(vec![Marker {
            id: 7,
            lat: DEFAULT_CENTER_LAT,
            lng: DEFAULT_CENTER_LNG,
            address: "ул. Софийска".to_string(),
            note: None,
            inserted_at: Utc::now(),
        }]);

        assert_eq!(session.markers().len(), 1);
        let marker = &session.markers()[0];
        assert_eq!(marker.id, MarkerId::Saved(7));
        assert!(marker.is_saved());
    }
}
