//! User-facing strings, collected in one place. The application ships in
//! Bulgarian; the API keeps its infrastructure errors in English.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Placeholder shown while reverse geocoding is in flight.
pub const ADDRESS_RESOLVING: &str = "Зареждане на адрес...";

/// Fallback when the geocoder returns no usable address component.
pub const ADDRESS_UNKNOWN: &str = "Без адресна информация";

/// Fallback when the geocoding request itself fails.
pub const ADDRESS_FETCH_FAILED: &str = "Грешка при зареждане на адреса";

/// Rejection shown when a pin is dropped outside the village boundary.
pub const GEOFENCE_REJECTED: &str = "Местоположението е извън границите на селото";

/// Rejection shown when a dragged draft ends up outside the boundary at save time.
pub const GEOFENCE_REJECTED_ON_SAVE: &str =
    "Докладът е извън границите на селото и не може да бъде запазен";

pub const REPORT_CREATED: &str = "Докладът е приет успешно.";
pub const REPORT_UPDATED: &str = "Докладът е обновен.";
pub const REPORT_DELETED: &str = "Докладът е изтрит.";

/// Failure classes of the browser's single-shot geolocation query.
///
/// The client reports these verbatim; the catalog below gives each one a
/// localized message so every device-capability failure has a distinct,
/// user-readable explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    InsecureContext,
}

impl GeolocationErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            GeolocationErrorKind::PermissionDenied => "Достъпът до местоположението е отказан",
            GeolocationErrorKind::PositionUnavailable => {
                "Местоположението не може да бъде определено"
            }
            GeolocationErrorKind::Timeout => "Времето за определяне на местоположението изтече",
            GeolocationErrorKind::InsecureContext => {
                "Определянето на местоположение изисква защитена (HTTPS) връзка"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geolocation_messages_are_distinct() {
        let kinds = [
            GeolocationErrorKind::PermissionDenied,
            GeolocationErrorKind::PositionUnavailable,
            GeolocationErrorKind::Timeout,
            GeolocationErrorKind::InsecureContext,
        ];

        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a.message(), b.message());
            }
        }
    }
}
