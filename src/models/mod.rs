pub mod stats;
pub mod task;

pub use stats::{DailyStars, RollingAverage, WeeklyBreakdown, WeeklyTaskStats};
pub use task::{DayProgress, Task, TaskId};
