pub mod dtos;
pub mod geofence;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use geofence::Geofence;
pub use services::{GeocodingService, LocalMarkerStore, MarkerStore, PgMarkerStore, ReverseGeocoder};
