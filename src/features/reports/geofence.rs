use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Earth's radius in kilometers (for Haversine formula)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Calculate Haversine distance between two points in kilometers
pub fn distance_km(a: LatLng, b: LatLng) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// The circular boundary within which reports are accepted.
///
/// Center and radius come from configuration; no antipodal handling is
/// needed at village scale.
#[derive(Debug, Clone, Copy)]
pub struct Geofence {
    pub center: LatLng,
    pub radius_km: f64,
}

impl Geofence {
    pub fn new(center: LatLng, radius_km: f64) -> Self {
        Self { center, radius_km }
    }

    pub fn distance_from_center_km(&self, point: LatLng) -> f64 {
        distance_km(point, self.center)
    }

    /// Containment check with an inclusive boundary: a point at exactly the
    /// configured radius is admitted.
    pub fn contains(&self, point: LatLng) -> bool {
        self.distance_from_center_km(point) <= self.radius_km
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::{DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG};

    fn village_center() -> LatLng {
        LatLng::new(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG)
    }

    #[test]
    fn test_distance_same_point_is_zero() {
        let center = village_center();
        assert_eq!(distance_km(center, center), 0.0);
    }

    #[test]
    fn test_distance_known_pair() {
        // Chepintsi to central Sofia, roughly 33 km by Haversine
        let sofia = LatLng::new(42.6977, 23.3219);
        let d = distance_km(village_center(), sofia);
        assert!(d > 30.0 && d < 36.0, "unexpected distance: {}", d);
    }

    #[test]
    fn test_contains_center() {
        let fence = Geofence::new(village_center(), 1.5);
        assert!(fence.contains(village_center()));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let center = village_center();
        // A point slightly north of center; a fence whose radius is exactly
        // that distance must still admit it.
        let point = LatLng::new(center.lat + 0.01, center.lng);
        let d = distance_km(center, point);

        let fence = Geofence::new(center, d);
        assert!(fence.contains(point));

        let tighter = Geofence::new(center, d * 0.999);
        assert!(!tighter.contains(point));
    }

    #[test]
    fn test_rejects_point_outside_radius() {
        // ~2 km north of center with a 1.5 km fence
        let fence = Geofence::new(village_center(), 1.5);
        let outside = LatLng::new(DEFAULT_CENTER_LAT + 0.018, DEFAULT_CENTER_LNG);
        assert!(fence.distance_from_center_km(outside) > 1.5);
        assert!(!fence.contains(outside));
    }
}
