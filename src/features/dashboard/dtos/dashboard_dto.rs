use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::DEFAULT_RECENT_LIMIT;

/// Lightweight stats for the home page header
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummaryDto {
    pub total_reports: i64,
    pub reports_this_week: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_report_at: Option<DateTime<Utc>>,
}

/// Query parameters for the recent-reports listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RecentQuery {
    /// Number of reports to return (default: 10, max: 50)
    #[serde(default = "default_recent_limit")]
    #[param(minimum = 1, maximum = 50)]
    pub limit: usize,
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

impl Default for RecentQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RECENT_LIMIT,
        }
    }
}
