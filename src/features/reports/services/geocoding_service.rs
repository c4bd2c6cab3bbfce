use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::config::GeocoderConfig;
use crate::core::error::{AppError, Result};
use crate::shared::locale;

/// Converts coordinates to a human-readable address string.
///
/// Failure is absorbed into the returned string, so callers never need a
/// dedicated error path for address lookups.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn resolve_address(&self, lat: f64, lng: f64) -> String;
}

/// Nominatim reverse-geocoding response structure
#[derive(Debug, Deserialize)]
pub struct NominatimReverseResponse {
    pub display_name: Option<String>,
    pub address: Option<NominatimAddress>,
}

/// Nominatim address components, limited to the ones we display
#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    pub road: Option<String>,
    pub house_number: Option<String>,
    pub neighbourhood: Option<String>,
    pub hamlet: Option<String>,
    pub suburb: Option<String>,
}

impl NominatimAddress {
    /// Pick the display string: street (+ house number if present), then
    /// neighbourhood, hamlet, suburb.
    pub fn display_label(&self) -> Option<String> {
        if let Some(road) = &self.road {
            return Some(match &self.house_number {
                Some(number) => format!("{} {}", road, number),
                None => road.clone(),
            });
        }

        self.neighbourhood
            .clone()
            .or_else(|| self.hamlet.clone())
            .or_else(|| self.suburb.clone())
    }
}

/// Service for reverse geocoding marker positions using Nominatim
pub struct GeocodingService {
    client: reqwest::Client,
    base_url: String,
    language: String,
}

impl GeocodingService {
    pub fn new(config: &GeocoderConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(config.user_agent.clone())
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: config.base_url.clone(),
            language: config.language.clone(),
        }
    }

    async fn execute_request(&self, lat: f64, lng: f64) -> Result<NominatimReverseResponse> {
        let url = format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}&zoom=19&addressdetails=1&accept-language={}",
            self.base_url, lat, lng, self.language
        );

        tracing::debug!("Reverse geocoding ({}, {}) -> {}", lat, lng, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Nominatim request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse Nominatim response: {}", e))
        })
    }
}

#[async_trait]
impl ReverseGeocoder for GeocodingService {
    async fn resolve_address(&self, lat: f64, lng: f64) -> String {
        match self.execute_request(lat, lng).await {
            Ok(response) => response
                .address
                .as_ref()
                .and_then(|a| a.display_label())
                .unwrap_or_else(|| locale::ADDRESS_UNKNOWN.to_string()),
            Err(e) => {
                tracing::warn!("Reverse geocoding failed for ({}, {}): {}", lat, lng, e);
                locale::ADDRESS_FETCH_FAILED.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label_prefers_road_with_house_number() {
        let addr = NominatimAddress {
            road: Some("ул. Васил Левски".to_string()),
            house_number: Some("5".to_string()),
            neighbourhood: Some("Център".to_string()),
            ..Default::default()
        };
        assert_eq!(addr.display_label().as_deref(), Some("ул. Васил Левски 5"));
    }

    #[test]
    fn test_display_label_road_without_house_number() {
        let addr = NominatimAddress {
            road: Some("ул. Христо Ботев".to_string()),
            ..Default::default()
        };
        assert_eq!(addr.display_label().as_deref(), Some("ул. Христо Ботев"));
    }

    #[test]
    fn test_display_label_falls_back_in_preference_order() {
        let addr = NominatimAddress {
            neighbourhood: Some("Махала Горна".to_string()),
            hamlet: Some("Чепинци".to_string()),
            suburb: Some("Нови Искър".to_string()),
            ..Default::default()
        };
        assert_eq!(addr.display_label().as_deref(), Some("Махала Горна"));

        let addr = NominatimAddress {
            hamlet: Some("Чепинци".to_string()),
            suburb: Some("Нови Искър".to_string()),
            ..Default::default()
        };
        assert_eq!(addr.display_label().as_deref(), Some("Чепинци"));

        let addr = NominatimAddress {
            suburb: Some("Нови Искър".to_string()),
            ..Default::default()
        };
        assert_eq!(addr.display_label().as_deref(), Some("Нови Искър"));
    }

    #[test]
    fn test_display_label_empty_address() {
        assert_eq!(NominatimAddress::default().display_label(), None);
    }

    #[test]
    fn test_parse_reverse_response() {
        let json = r#"{
            "place_id": 12345,
            "display_name": "ул. Софийска, Чепинци, София, България",
            "address": {
                "road": "ул. Софийска",
                "hamlet": "Чепинци",
                "postcode": "1554",
                "country_code": "bg"
            }
        }"#;

        let parsed: NominatimReverseResponse = serde_json::from_str(json).unwrap();
        let label = parsed.address.unwrap().display_label();
        assert_eq!(label.as_deref(), Some("ул. Софийска"));
    }

    #[tokio::test]
    async fn test_resolve_address_absorbs_network_failure() {
        let config = GeocoderConfig {
            // Unroutable: connection is refused immediately
            base_url: "http://127.0.0.1:1".to_string(),
            language: "bg".to_string(),
            user_agent: "SvetnichkiCore/test".to_string(),
        };
        let service = GeocodingService::new(&config);

        let address = service.resolve_address(42.7050, 23.7250).await;
        assert_eq!(address, locale::ADDRESS_FETCH_FAILED);
    }
}
