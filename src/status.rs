use crate::timemath::ClockRange;
use serde::Serialize;

/// Time-derived state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Upcoming,
    Current,
    Completed,
}

impl TaskStatus {
    /// The range is half-open: a task is current from its start minute up to,
    /// but not including, its end minute.
    pub fn resolve(range: ClockRange, now: u32) -> Self {
        if now < range.start {
            TaskStatus::Upcoming
        } else if now < range.end {
            TaskStatus::Current
        } else {
            TaskStatus::Completed
        }
    }
}

/// A manual completion forces "Done" whatever the clock says.
pub fn status_label(manually_completed: bool, status: TaskStatus) -> &'static str {
    if manually_completed {
        return "Done";
    }
    match status {
        TaskStatus::Upcoming => "Later",
        TaskStatus::Current => "Now",
        TaskStatus::Completed => "Done",
    }
}
