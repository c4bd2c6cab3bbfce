use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::config::GeofenceConfig;
use crate::features::reports::geofence::LatLng;
use crate::shared::locale::{self, GeolocationErrorKind};

/// Everything the map client needs at startup: geofence parameters, tile
/// settings and the localized message catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientBootstrapDto {
    pub center: LatLng,
    pub radius_km: f64,
    pub default_zoom: u8,
    pub tile_url: String,
    pub tile_max_zoom: u8,
    pub messages: MessageCatalogDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageCatalogDto {
    pub address_resolving: String,
    pub address_unknown: String,
    pub address_fetch_failed: String,
    pub geofence_rejected: String,
    pub geofence_rejected_on_save: String,
    pub geolocation: GeolocationMessagesDto,
}

/// Localized messages for the device geolocation failure classes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeolocationMessagesDto {
    pub permission_denied: String,
    pub position_unavailable: String,
    pub timeout: String,
    pub insecure_context: String,
}

impl ClientBootstrapDto {
    pub fn from_config(config: &GeofenceConfig) -> Self {
        Self {
            center: LatLng::new(config.center_lat, config.center_lng),
            radius_km: config.radius_km,
            default_zoom: config.default_zoom,
            tile_url: config.tile_url.clone(),
            tile_max_zoom: config.tile_max_zoom,
            messages: MessageCatalogDto {
                address_resolving: locale::ADDRESS_RESOLVING.to_string(),
                address_unknown: locale::ADDRESS_UNKNOWN.to_string(),
                address_fetch_failed: locale::ADDRESS_FETCH_FAILED.to_string(),
                geofence_rejected: locale::GEOFENCE_REJECTED.to_string(),
                geofence_rejected_on_save: locale::GEOFENCE_REJECTED_ON_SAVE.to_string(),
                geolocation: GeolocationMessagesDto {
                    permission_denied: GeolocationErrorKind::PermissionDenied.message().to_string(),
                    position_unavailable: GeolocationErrorKind::PositionUnavailable
                        .message()
                        .to_string(),
                    timeout: GeolocationErrorKind::Timeout.message().to_string(),
                    insecure_context: GeolocationErrorKind::InsecureContext.message().to_string(),
                },
            },
        }
    }
}
