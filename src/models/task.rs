use serde::{Deserialize, Serialize};

/// Server-assigned task identifier, stable across dates.
pub type TaskId = i64;

/// A task as listed for one calendar day: the task itself plus its
/// completion status and footnote for the requested date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_today: bool,
    #[serde(default)]
    pub footnote: Option<String>,
}

impl Task {
    /// Footnote text for display, treating empty strings as absent.
    pub fn display_footnote(&self) -> Option<&str> {
        self.footnote.as_deref().filter(|f| !f.is_empty())
    }
}

/// Completion tally for the currently viewed day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayProgress {
    pub completed: usize,
    pub total: usize,
}

impl DayProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}
