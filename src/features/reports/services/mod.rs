pub mod geocoding_service;
pub mod local_store;
pub mod marker_store;

pub use geocoding_service::{GeocodingService, ReverseGeocoder};
pub use local_store::LocalMarkerStore;
pub use marker_store::{MarkerStore, PgMarkerStore};
