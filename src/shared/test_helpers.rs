//! Shared fixtures for lifecycle and handler tests: an in-memory marker
//! store with scriptable failures and a canned geocoder stub.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{Marker, MarkerChanges, NewMarker};
use crate::features::reports::services::{MarkerStore, ReverseGeocoder};

#[derive(Default)]
pub struct MemoryMarkerStore {
    state: Mutex<MemoryState>,
    fail_creates: AtomicBool,
    fail_deletes: AtomicBool,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    markers: Vec<Marker>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_id: 1,
                markers: Vec::new(),
            }),
            ..Default::default()
        }
    }

    pub fn set_fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarkerStore for MemoryMarkerStore {
    async fn fetch_all(&self) -> Result<Vec<Marker>> {
        let state = self.state.lock().unwrap();
        let mut markers = state.markers.clone();
        markers.sort_by(|a, b| (b.inserted_at, b.id).cmp(&(a.inserted_at, a.id)));
        Ok(markers)
    }

    async fn get(&self, id: i64) -> Result<Option<Marker>> {
        let state = self.state.lock().unwrap();
        Ok(state.markers.iter().find(|m| m.id == id).cloned())
    }

    async fn create(&self, data: &NewMarker) -> Result<Marker> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated create failure".to_string()));
        }

        let mut state = self.state.lock().unwrap();
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
        Ok(marker)
    }

    async fn update(&self, id: i64, changes: &MarkerChanges) -> Result<Marker> {
        let mut state = self.state.lock().unwrap();
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
        Ok(marker.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated delete failure".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        let before = state.markers.len();
        state.markers.retain(|m| m.id != id);
        if state.markers.len() == before {
            return Err(AppError::NotFound(format!("Report {} not found", id)));
        }
        Ok(())
    }
}

/// Geocoder stub returning a canned address
pub struct StubGeocoder {
    response: String,
    calls: AtomicUsize,
}

impl StubGeocoder {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseGeocoder for StubGeocoder {
    async fn resolve_address(&self, _lat: f64, _lng: f64) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}
