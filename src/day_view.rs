use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::api::TaskService;
use crate::error::AppError;
use crate::models::{DayProgress, Task, TaskId};

/// Owned snapshot of the day cache. This is the only state the presentation
/// layer reads.
#[derive(Debug, Clone)]
pub struct DayView {
    pub view_date: NaiveDate,
    pub tasks: Vec<Task>,
}

impl DayView {
    pub fn progress(&self) -> DayProgress {
        DayProgress {
            completed: self.tasks.iter().filter(|t| t.completed_today).count(),
            total: self.tasks.len(),
        }
    }
}

struct DayState {
    view_date: NaiveDate,
    tasks: Vec<Task>,
}

/// Day-scoped task-and-completion cache over the remote task service.
///
/// The full list is refetched on every date change; single-task mutations
/// are patched locally after the server acknowledges them. Reorder is the
/// one optimistic operation, rolled back by a full refetch on failure.
///
/// The state mutex is only held between awaits, never across one. Each
/// fetch carries a token from a monotonic counter so that a slow response
/// to an earlier date change can never overwrite a newer one.
pub struct DayViewModel {
    service: Arc<dyn TaskService>,
    state: Mutex<DayState>,
    fetch_seq: AtomicU64,
}

impl DayViewModel {
    pub fn new(service: Arc<dyn TaskService>, view_date: NaiveDate) -> Self {
        Self {
            service,
            state: Mutex::new(DayState {
                view_date,
                tasks: Vec::new(),
            }),
            fetch_seq: AtomicU64::new(0),
        }
    }

    /// View model positioned on the local calendar day.
    pub fn for_today(service: Arc<dyn TaskService>) -> Self {
        Self::new(service, Local::now().date_naive())
    }

    pub fn view_date(&self) -> NaiveDate {
        self.state.lock().unwrap().view_date
    }

    pub fn day_view(&self) -> DayView {
        let state = self.state.lock().unwrap();
        DayView {
            view_date: state.view_date,
            tasks: state.tasks.clone(),
        }
    }

    pub fn progress(&self) -> DayProgress {
        self.day_view().progress()
    }

    /// Replaces the viewed date and rebuilds the task list from the server.
    /// Safe to call repeatedly in quick succession: only the newest fetch
    /// may install its result, a superseded response is discarded.
    pub async fn set_view_date(&self, date: NaiveDate) -> Result<(), AppError> {
        let token = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.lock().unwrap().view_date = date;

        let result = self.service.list_tasks(Some(date)).await;

        let mut state = self.state.lock().unwrap();
        if self.fetch_seq.load(Ordering::SeqCst) != token {
            debug!("discarding superseded task list for {}", date);
            return Ok(());
        }
        state.tasks = result?;
        debug!("loaded {} tasks for {}", state.tasks.len(), date);
        Ok(())
    }

    /// Full resynchronizing refetch of the current date.
    pub async fn refresh(&self) -> Result<(), AppError> {
        let date = self.view_date();
        self.set_view_date(date).await
    }

    pub async fn add_task(&self, name: &str) -> Result<Task, AppError> {
        let name = validated_name(name)?;
        let task = self.service.create_task(&name).await?;
        self.state.lock().unwrap().tasks.push(task.clone());
        Ok(task)
    }

    pub async fn rename_task(&self, id: TaskId, name: &str) -> Result<(), AppError> {
        let name = validated_name(name)?;
        self.require_known(id)?;
        self.service.rename_task(id, &name).await?;
        let mut state = self.state.lock().unwrap();
        if let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) {
            task.name = name;
        }
        Ok(())
    }

    /// Removes the task from the current view. History on other dates is
    /// untouched; the server preserves its stars.
    pub async fn remove_task(&self, id: TaskId) -> Result<(), AppError> {
        self.require_known(id)?;
        self.service.delete_task(id).await?;
        self.state.lock().unwrap().tasks.retain(|t| t.id != id);
        Ok(())
    }

    /// Completes or uncompletes the task for the viewed date, flipping the
    /// local flag only after the server acknowledges. Returns the new
    /// completion state. On failure local state is left untouched.
    pub async fn toggle_completion(&self, id: TaskId) -> Result<bool, AppError> {
        let (date, completed) = {
            let state = self.state.lock().unwrap();
            let task = state
                .tasks
                .iter()
                .find(|t| t.id == id)
                .ok_or(AppError::NotFound)?;
            (state.view_date, task.completed_today)
        };

        if completed {
            self.service.uncomplete_task(id, date).await?;
        } else {
            self.service.complete_task(id, date).await?;
        }

        let mut state = self.state.lock().unwrap();
        if let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) {
            task.completed_today = !completed;
            if completed {
                task.footnote = None;
            }
        }
        Ok(!completed)
    }

    /// Saves the footnote for the viewed date. Empty text is allowed and
    /// clears the note. Saving a footnote creates the completion record on
    /// the server, so the task always ends up completed.
    pub async fn set_footnote(&self, id: TaskId, text: &str) -> Result<(), AppError> {
        self.require_known(id)?;
        let date = self.view_date();
        let text = text.trim();
        self.service.set_footnote(id, date, text).await?;
        let mut state = self.state.lock().unwrap();
        if let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) {
            task.footnote = Some(text.to_string());
            task.completed_today = true;
        }
        Ok(())
    }

    /// Reindexes the list to match `ids` immediately, then tells the
    /// server. On failure the optimistic order is discarded by a full
    /// refetch and the original error is returned.
    pub async fn reorder(&self, ids: &[TaskId]) -> Result<(), AppError> {
        {
            let mut state = self.state.lock().unwrap();
            let mut reordered = Vec::with_capacity(state.tasks.len());
            for id in ids {
                if let Some(index) = state.tasks.iter().position(|t| t.id == *id) {
                    reordered.push(state.tasks.remove(index));
                }
            }
            // Tasks not named keep their relative order at the tail.
            reordered.append(&mut state.tasks);
            state.tasks = reordered;
        }

        if let Err(err) = self.service.reorder_tasks(ids).await {
            warn!("reorder failed, resynchronizing: {}", err);
            if let Err(refetch) = self.refresh().await {
                warn!("resynchronizing refetch failed: {}", refetch);
            }
            return Err(err);
        }
        Ok(())
    }

    fn require_known(&self, id: TaskId) -> Result<(), AppError> {
        let state = self.state.lock().unwrap();
        if state.tasks.iter().any(|t| t.id == id) {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }
}

fn validated_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        Err(AppError::Validation(
            "Task name cannot be empty".to_string(),
        ))
    } else {
        Ok(name.to_string())
    }
}
