// =============================================================================
// GEOFENCE / MAP DEFAULTS
// =============================================================================

/// Chepintsi village center, the default geofence anchor.
pub const DEFAULT_CENTER_LAT: f64 = 42.7050;
pub const DEFAULT_CENTER_LNG: f64 = 23.7250;

/// Reports are accepted within this many kilometers of the village center.
pub const DEFAULT_RADIUS_KM: f64 = 1.5;

/// Initial zoom for the map page.
pub const DEFAULT_MAP_ZOOM: u8 = 15;

/// Ceiling supported by the OSM tile servers.
pub const TILE_MAX_ZOOM: u8 = 19;

pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

// =============================================================================
// LISTING LIMITS
// =============================================================================

/// Default number of reports on the recent list
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Maximum number of reports a recent query may request
pub const MAX_RECENT_LIMIT: usize = 50;
