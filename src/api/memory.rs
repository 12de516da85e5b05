use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local, NaiveDate};

use crate::error::AppError;
use crate::models::{DailyStars, RollingAverage, Task, TaskId, WeeklyBreakdown, WeeklyTaskStats};

use super::TaskService;

#[derive(Debug, Clone)]
struct StoredTask {
    id: TaskId,
    name: String,
    position: i64,
    active: bool,
}

#[derive(Default)]
struct Store {
    next_id: TaskId,
    tasks: Vec<StoredTask>,
    /// Completion per (task, date); the value is the footnote, `None` when
    /// the task was completed without one.
    completions: BTreeMap<(TaskId, NaiveDate), Option<String>>,
}

/// In-process stand-in for the remote task service, modeling its contract:
/// idempotent completes, footnote saves that create the completion, soft
/// deletes that preserve historical stars, zero-filled daily windows and
/// trailing seven-day weekly windows. Tests can pin "today", inject a
/// one-shot failure, and delay responses to exercise races.
pub struct InMemoryTaskService {
    store: Mutex<Store>,
    today: NaiveDate,
    delay: Mutex<Option<Duration>>,
    fail_next: Mutex<Option<String>>,
}

impl InMemoryTaskService {
    pub fn new() -> Self {
        Self::with_today(Local::now().date_naive())
    }

    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            today,
            delay: Mutex::new(None),
            fail_next: Mutex::new(None),
        }
    }

    /// The next call to any service method fails with this message.
    pub fn inject_failure(&self, message: impl Into<String>) {
        *self.fail_next.lock().unwrap() = Some(message.into());
    }

    /// Delay applied at the start of every call until cleared.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    async fn begin(&self) -> Result<(), AppError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.fail_next.lock().unwrap().take() {
            return Err(AppError::Service { message });
        }
        Ok(())
    }

    fn ordered_active(store: &Store) -> Vec<StoredTask> {
        let mut tasks: Vec<StoredTask> =
            store.tasks.iter().filter(|t| t.active).cloned().collect();
        tasks.sort_by_key(|t| (t.position, t.id));
        tasks
    }

    fn stars_between(store: &Store, start: NaiveDate, end: NaiveDate) -> u32 {
        store
            .completions
            .keys()
            .filter(|(_, date)| *date >= start && *date <= end)
            .count() as u32
    }
}

impl Default for InMemoryTaskService {
    fn default() -> Self {
        Self::new()
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[async_trait]
impl TaskService for InMemoryTaskService {
    async fn list_tasks(&self, date: Option<NaiveDate>) -> Result<Vec<Task>, AppError> {
        self.begin().await?;
        let date = date.unwrap_or(self.today);
        let store = self.store.lock().unwrap();
        Ok(Self::ordered_active(&store)
            .into_iter()
            .map(|t| {
                let completion = store.completions.get(&(t.id, date));
                Task {
                    id: t.id,
                    name: t.name,
                    created_at: None,
                    completed_today: completion.is_some(),
                    footnote: completion.cloned().flatten(),
                }
            })
            .collect())
    }

    async fn create_task(&self, name: &str) -> Result<Task, AppError> {
        self.begin().await?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::service("Task name cannot be empty"));
        }
        let mut store = self.store.lock().unwrap();
        store.next_id += 1;
        let id = store.next_id;
        let position = store.tasks.iter().map(|t| t.position + 1).max().unwrap_or(0);
        store.tasks.push(StoredTask {
            id,
            name: name.to_string(),
            position,
            active: true,
        });
        Ok(Task {
            id,
            name: name.to_string(),
            created_at: None,
            completed_today: false,
            footnote: None,
        })
    }

    async fn rename_task(&self, id: TaskId, name: &str) -> Result<Task, AppError> {
        self.begin().await?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::service("Task name cannot be empty"));
        }
        let mut store = self.store.lock().unwrap();
        let task = store
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.active)
            .ok_or_else(|| AppError::service("Task not found"))?;
        task.name = name.to_string();
        Ok(Task {
            id,
            name: name.to_string(),
            created_at: None,
            completed_today: false,
            footnote: None,
        })
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), AppError> {
        self.begin().await?;
        let mut store = self.store.lock().unwrap();
        let task = store
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.active)
            .ok_or_else(|| AppError::service("Task not found"))?;
        // Soft delete; completions stay behind ("stars preserved").
        task.active = false;
        Ok(())
    }

    async fn complete_task(&self, id: TaskId, date: NaiveDate) -> Result<(), AppError> {
        self.begin().await?;
        let mut store = self.store.lock().unwrap();
        if !store.tasks.iter().any(|t| t.id == id && t.active) {
            return Err(AppError::service("Task not found"));
        }
        store.completions.entry((id, date)).or_insert(None);
        Ok(())
    }

    async fn uncomplete_task(&self, id: TaskId, date: NaiveDate) -> Result<(), AppError> {
        self.begin().await?;
        let mut store = self.store.lock().unwrap();
        store.completions.remove(&(id, date));
        Ok(())
    }

    async fn set_footnote(
        &self,
        id: TaskId,
        date: NaiveDate,
        footnote: &str,
    ) -> Result<(), AppError> {
        self.begin().await?;
        let mut store = self.store.lock().unwrap();
        if !store.tasks.iter().any(|t| t.id == id && t.active) {
            return Err(AppError::service("Task not found"));
        }
        // Creating the record marks the task completed for that date.
        store
            .completions
            .insert((id, date), Some(footnote.trim().to_string()));
        Ok(())
    }

    async fn reorder_tasks(&self, ids: &[TaskId]) -> Result<(), AppError> {
        self.begin().await?;
        let mut store = self.store.lock().unwrap();
        for (index, id) in ids.iter().enumerate() {
            if let Some(task) = store.tasks.iter_mut().find(|t| t.id == *id) {
                task.position = index as i64;
            }
        }
        Ok(())
    }

    async fn daily_star_counts(&self, days: u32) -> Result<Vec<DailyStars>, AppError> {
        self.begin().await?;
        let days = days.clamp(7, 90);
        let end = self.today;
        let start = end - ChronoDuration::days(days as i64 - 1);
        let store = self.store.lock().unwrap();
        let mut series = Vec::with_capacity(days as usize);
        let mut date = start;
        while date <= end {
            series.push(DailyStars {
                date: date.format("%Y-%m-%d").to_string(),
                day_name: Some(date.format("%a").to_string()),
                star_count: Self::stars_between(&store, date, date),
            });
            date += ChronoDuration::days(1);
        }
        Ok(series)
    }

    async fn weekly_breakdown(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<WeeklyBreakdown, AppError> {
        self.begin().await?;
        let reference = date.unwrap_or(self.today);
        let end = reference - ChronoDuration::days(1);
        let start = reference - ChronoDuration::days(7);
        let store = self.store.lock().unwrap();
        let tasks = Self::ordered_active(&store)
            .into_iter()
            .map(|t| {
                let star_count = store
                    .completions
                    .keys()
                    .filter(|(id, date)| *id == t.id && *date >= start && *date <= end)
                    .count() as u32;
                WeeklyTaskStats {
                    task_id: t.id,
                    task_name: t.name,
                    star_count,
                    max_possible: Some(7),
                    percentage: round1(star_count as f64 / 7.0 * 100.0),
                }
            })
            .collect();
        Ok(WeeklyBreakdown {
            week_start: start.format("%Y-%m-%d").to_string(),
            week_end: end.format("%Y-%m-%d").to_string(),
            days_in_period: Some(7),
            tasks,
        })
    }

    async fn rolling_average(
        &self,
        date: Option<NaiveDate>,
        days: u32,
    ) -> Result<RollingAverage, AppError> {
        self.begin().await?;
        if days < 1 {
            return Err(AppError::service("Days must be at least 1"));
        }
        let reference = date.unwrap_or(self.today);
        let end = reference - ChronoDuration::days(1);
        let start = reference - ChronoDuration::days(days as i64);
        let store = self.store.lock().unwrap();
        let total_stars = Self::stars_between(&store, start, end);
        Ok(RollingAverage {
            average: round1(total_stars as f64 / days as f64),
            total_stars: Some(total_stars),
            days: Some(days),
        })
    }
}
