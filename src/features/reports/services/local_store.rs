use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{Marker, MarkerChanges, NewMarker};
use crate::features::reports::services::MarkerStore;

/// File-backed marker store for deployments without a database.
///
/// The legacy variant of the app kept a serialized array of marker records
/// under a browser storage key; this is the server-side equivalent, one JSON
/// file holding every report. Ids are assigned from a monotonic counter
/// seeded by the largest id on disk.
pub struct LocalMarkerStore {
    path: PathBuf,
    state: Mutex<LocalState>,
}

struct LocalState {
    next_id: i64,
    markers: Vec<Marker>,
}

impl LocalMarkerStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let markers: Vec<Marker> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AppError::Internal(format!(
                    "Corrupt marker store file {}: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "Failed to read marker store file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let next_id = markers.iter().map(|m| m.id).max().unwrap_or(0) + 1;

        Ok(Self {
            path,
            state: Mutex::new(LocalState { next_id, markers }),
        })
    }

    async fn persist(&self, state: &LocalState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::Internal(format!(
                        "Failed to create marker store directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let json = serde_json::to_vec_pretty(&state.markers)
            .map_err(|e| AppError::Internal(format!("Failed to serialize markers: {}", e)))?;

        tokio::fs::write(&self.path, json).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to write marker store file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl MarkerStore for LocalMarkerStore {
    async fn fetch_all(&self) -> Result<Vec<Marker>> {
        let state = self.state.lock().await;
        let mut markers = state.markers.clone();
        markers.sort_by(|a, b| (b.inserted_at, b.id).cmp(&(a.inserted_at, a.id)));
        Ok(markers)
    }

    async fn get(&self, id: i64) -> Result<Option<Marker>> {
        let state = self.state.lock().await;
        Ok(state.markers.iter().find(|m| m.id == id).cloned())
    }

    async fn create(&self, data: &NewMarker) -> Result<Marker> {
        let mut state = self.state.lock().await;

        let marker = Marker {
            id: state.next_id,
            lat: data.lat,
            lng: data.lng,
            address: data.address.clone(),
            note: data.note.clone(),
            inserted_at: Utc::now(),
        };

        state.next_id += 1;
        state.markers.push(marker.clone());
        self.persist(&state).await?;

        tracing::info!(
            "Created report {} at ({}, {}) in local store",
            marker.id,
            marker.lat,
            marker.lng
        );

        Ok(marker)
    }

    async fn update(&self, id: i64, changes: &MarkerChanges) -> Result<Marker> {
        let mut state = self.state.lock().await;

        let marker = state
            .markers
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        if let Some(address) = &changes.address {
            marker.address = address.clone();
        }
        if let Some(note) = &changes.note {
            marker.note = Some(note.clone());
        }

        let updated = marker.clone();
        self.persist(&state).await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut state = self.state.lock().await;

        let before = state.markers.len();
        state.markers.retain(|m| m.id != id);
        if state.markers.len() == before {
            return Err(AppError::NotFound(format!("Report {} not found", id)));
        }

        self.persist(&state).await?;
        tracing::info!("Deleted report {} from local store", id);
        Ok(())
    }
}
