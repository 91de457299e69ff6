use crate::ledger::{LedgerSummary, SummaryCheck, TransactionRecord};
use crate::status::TaskStatus;
use crate::timemath::ClockRange;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SubtaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subtask {
    pub id: SubtaskId,
    pub label: String,
    /// Completion carried by the source payload, if any.
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub range: ClockRange,
    pub name: String,
    /// Layout lane only.
    pub column: i64,
    pub subtasks: Vec<Subtask>,
    pub manual_completion: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubtaskView {
    pub id: SubtaskId,
    pub label: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub id: TaskId,
    pub time: ClockRange,
    pub name: String,
    pub column: i64,
    pub status: TaskStatus,
    pub label: &'static str,
    pub completed: bool,
    pub subtasks: Vec<SubtaskView>,
}

#[derive(Debug, Serialize)]
pub struct ColumnView {
    pub column: i64,
    pub progress: f64,
    pub tasks: Vec<TaskView>,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub date_key: String,
    pub now: String,
    pub day_progress: f64,
    pub columns: Vec<ColumnView>,
}

/// Partial edit of a task. `time` uses the `"HH:MM - HH:MM"` form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub time: Option<String>,
    pub column: Option<i64>,
    pub subtasks: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Persisted {
    Remote,
    Local,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub persisted: Persisted,
    pub task: TaskView,
}

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    pub transactions: Vec<TransactionRecord>,
    pub summary: LedgerSummary,
    pub summary_check: SummaryCheck,
}
