use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::TaskService;
use crate::error::AppError;
use crate::models::{DailyStars, RollingAverage, WeeklyBreakdown};

/// Default window for the daily star chart; user-selectable.
pub const DEFAULT_DAILY_WINDOW: u32 = 30;
/// Fixed window for the weekly breakdown and the banner average.
pub const ROLLING_WINDOW: u32 = 7;

/// Pass-through stat queries against the remote service. Each call is
/// independent and idempotent; all aggregation math happens server-side.
pub struct StatsAggregator {
    service: Arc<dyn TaskService>,
}

impl StatsAggregator {
    pub fn new(service: Arc<dyn TaskService>) -> Self {
        Self { service }
    }

    pub async fn daily_star_counts(&self, days: u32) -> Result<Vec<DailyStars>, AppError> {
        self.service.daily_star_counts(days).await
    }

    pub async fn weekly_breakdown(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<WeeklyBreakdown, AppError> {
        self.service.weekly_breakdown(date).await
    }

    pub async fn rolling_average(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<RollingAverage, AppError> {
        self.service.rolling_average(date, ROLLING_WINDOW).await
    }
}
