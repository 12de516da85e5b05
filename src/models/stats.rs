use serde::{Deserialize, Serialize};

use super::TaskId;

/// One day's star count in the daily series. The server fills days with no
/// completions with a zero count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStars {
    pub date: String,
    #[serde(default)]
    pub day_name: Option<String>,
    pub star_count: u32,
}

/// Per-task star tally over the trailing seven-day window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyTaskStats {
    pub task_id: TaskId,
    pub task_name: String,
    pub star_count: u32,
    #[serde(default)]
    pub max_possible: Option<u32>,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyBreakdown {
    pub week_start: String,
    pub week_end: String,
    #[serde(default)]
    pub days_in_period: Option<u32>,
    pub tasks: Vec<WeeklyTaskStats>,
}

/// Mean daily star count over a trailing window, rounded by the server to
/// one decimal place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingAverage {
    pub average: f64,
    #[serde(default)]
    pub total_stars: Option<u32>,
    #[serde(default)]
    pub days: Option<u32>,
}
