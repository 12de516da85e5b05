pub mod api;
pub mod chart;
pub mod day_view;
pub mod error;
pub mod models;
pub mod stats;
pub mod theme;

pub use api::{ApiConfig, HttpTaskService, TaskService};
pub use day_view::{DayView, DayViewModel};
pub use error::AppError;
pub use stats::StatsAggregator;
