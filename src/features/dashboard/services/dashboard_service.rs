use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::core::error::Result;
use crate::features::dashboard::dtos::DashboardSummaryDto;
use crate::features::reports::dtos::MarkerResponseDto;
use crate::features::reports::services::MarkerStore;
use crate::shared::constants::MAX_RECENT_LIMIT;

/// Service for the public home-page queries
pub struct DashboardService {
    store: Arc<dyn MarkerStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn MarkerStore>) -> Self {
        Self { store }
    }

    /// Lightweight stats for the home page header
    pub async fn get_summary(&self) -> Result<DashboardSummaryDto> {
        let markers = self.store.fetch_all().await?;

        let week_ago = Utc::now() - Duration::days(7);
        let reports_this_week = markers
            .iter()
            .filter(|m| m.inserted_at >= week_ago)
            .count() as i64;

        Ok(DashboardSummaryDto {
            total_reports: markers.len() as i64,
            reports_this_week,
            latest_report_at: markers.first().map(|m| m.inserted_at),
        })
    }

    /// Most recent reports, newest first
    pub async fn get_recent(&self, limit: usize) -> Result<Vec<MarkerResponseDto>> {
        let markers = self.store.fetch_all().await?;
        Ok(markers
            .into_iter()
            .take(limit.min(MAX_RECENT_LIMIT))
            .map(|m| m.into())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::NewMarker;
    use crate::shared::test_helpers::MemoryMarkerStore;

    fn report(address: &str) -> NewMarker {
        NewMarker {
            lat: 42.7050,
            lng: 23.7250,
            address: address.to_string(),
            note: None,
        }
    }

    #[tokio::test]
    async fn test_summary_counts() {
        let store = Arc::new(MemoryMarkerStore::new());
        store.create(&report("а")).await.unwrap();
        store.create(&report("б")).await.unwrap();

        let service = DashboardService::new(store);
        let summary = service.get_summary().await.unwrap();

        assert_eq!(summary.total_reports, 2);
        assert_eq!(summary.reports_this_week, 2);
        assert!(summary.latest_report_at.is_some());
    }

    #[tokio::test]
    async fn test_summary_empty_store() {
        let service = DashboardService::new(Arc::new(MemoryMarkerStore::new()));
        let summary = service.get_summary().await.unwrap();

        assert_eq!(summary.total_reports, 0);
        assert!(summary.latest_report_at.is_none());
    }

    #[tokio::test]
    async fn test_recent_respects_limit_and_order() {
        let store = Arc::new(MemoryMarkerStore::new());
        for i in 0..5 {
            store.create(&report(&format!("адрес {}", i))).await.unwrap();
        }

        let service = DashboardService::new(store);
        let recent = service.get_recent(3).await.unwrap();

        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].address, "адрес 4");
    }
}
