//! Client for the action-discriminated remote endpoint.
//!
//! Every call is a JSON `POST` carrying an `action` field; non-200 answers
//! carry `{error}`.

use crate::completion::{EntityRef, RemoteCompletion};
use crate::errors::DashboardError;
use crate::ledger::{Amount, LedgerSummary, TransactionKind, TransactionRecord};
use crate::models::{Subtask, SubtaskId, Task, TaskId};
use crate::timemath::parse_range;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoteSubtask {
    pub subtask_id: String,
    #[serde(default)]
    pub subtask_name: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct RemoteTask {
    pub task_id: String,
    pub time: String,
    pub name: String,
    #[serde(default)]
    pub subtasks: Vec<String>,
    pub column: f64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub subtask_details: Vec<RemoteSubtask>,
}

#[derive(Debug, Deserialize)]
struct ScheduleBody {
    schedule: Vec<RemoteTask>,
}

#[derive(Debug, Deserialize)]
pub struct RemoteTransaction {
    pub transaction_id: String,
    pub transaction_type: String,
    pub reason: String,
    pub amount: f64,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoteSummary {
    pub total_credit: f64,
    pub total_debit: f64,
    pub net_amount: f64,
}

#[derive(Debug, Deserialize)]
struct TransactionsBody {
    transactions: Vec<RemoteTransaction>,
    #[serde(default)]
    summary: Option<RemoteSummary>,
}

/// Body of the `update_task` action.
#[derive(Debug, Serialize)]
pub struct TaskUpdate<'a> {
    pub task_id: &'a str,
    pub task_name: &'a str,
    pub task_timing: String,
    pub residing_column: i64,
    pub subtasks: Vec<&'a str>,
}

impl<'a> From<&'a Task> for TaskUpdate<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            task_id: &task.id.0,
            task_name: &task.name,
            task_timing: task.range.to_string(),
            residing_column: task.column,
            subtasks: task.subtasks.iter().map(|s| s.label.as_str()).collect(),
        }
    }
}

impl RemoteClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DashboardError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Source(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one action with its fields and decodes the 200 body.
    pub async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        fields: Value,
    ) -> Result<T, DashboardError> {
        let mut body = match fields {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(DashboardError::Source(format!(
                    "{action}: request fields must be an object, got {other}"
                )));
            }
        };
        body.insert("action".into(), Value::String(action.to_string()));

        debug!(action, "remote call");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| source_error(action, format!("request failed: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| source_error(action, format!("reading body failed: {e}")))?;

        if status != reqwest::StatusCode::OK {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|body| body.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(source_error(action, format!("HTTP {}: {message}", status.as_u16())));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| source_error(action, format!("undecodable response: {e}")))
    }

    /// Calls an action whose 200 body carries nothing of interest.
    pub async fn send(&self, action: &str, fields: Value) -> Result<(), DashboardError> {
        self.call::<Value>(action, fields).await.map(|_| ())
    }

    pub async fn fetch_schedule(&self) -> Result<Vec<Task>, DashboardError> {
        let body: ScheduleBody = self.call("get_schedule", Value::Null).await?;
        body.schedule.into_iter().map(task_from_remote).collect()
    }

    pub async fn update_task(&self, task: &Task) -> Result<(), DashboardError> {
        let fields = serde_json::to_value(TaskUpdate::from(task))
            .map_err(|e| DashboardError::Source(format!("update_task: {e}")))?;
        self.send("update_task", fields).await
    }

    pub async fn fetch_transactions(
        &self,
        date: Option<&str>,
    ) -> Result<(Vec<TransactionRecord>, Option<LedgerSummary>), DashboardError> {
        let fields = match date {
            Some(date) => json!({ "date": date }),
            None => Value::Null,
        };
        let body: TransactionsBody = self.call("get_transactions", fields).await?;
        let records = body
            .transactions
            .into_iter()
            .map(transaction_from_remote)
            .collect::<Result<Vec<_>, _>>()?;
        let summary = body.summary.map(summary_from_remote).transpose()?;
        Ok((records, summary))
    }

    pub async fn add_transaction(&self, text: &str) -> Result<(), DashboardError> {
        self.send("add_transaction", json!({ "transaction_text": text }))
            .await
    }

    pub async fn delete_transaction(&self, id: &str) -> Result<(), DashboardError> {
        self.send("delete_transaction", json!({ "transaction_id": id }))
            .await
    }
}

impl RemoteCompletion for RemoteClient {
    async fn push(&self, entity: &EntityRef, value: bool) -> Result<(), DashboardError> {
        match entity {
            EntityRef::Task(id) => {
                self.send(
                    "update_task_completion",
                    json!({ "task_id": id.0, "is_completed": value }),
                )
                .await
            }
            EntityRef::Subtask(id) => {
                self.send(
                    "update_subtask_completion",
                    json!({ "subtask_id": id.0, "is_completed": value }),
                )
                .await
            }
        }
    }
}

fn source_error(action: &str, detail: String) -> DashboardError {
    warn!(action, "remote call failed: {detail}");
    DashboardError::Source(format!("{action}: {detail}"))
}

pub fn task_from_remote(remote: RemoteTask) -> Result<Task, DashboardError> {
    let range = parse_range(remote.time.trim())
        .map_err(|e| DashboardError::Source(format!("task {}: {e}", remote.task_id)))?;

    // `subtask_details` carries ids and flags; `subtasks` only labels.
    let subtasks = if remote.subtask_details.is_empty() {
        remote
            .subtasks
            .into_iter()
            .enumerate()
            .map(|(i, label)| Subtask {
                id: SubtaskId(format!("{}-{i}", remote.task_id)),
                label,
                completed: None,
            })
            .collect()
    } else {
        remote
            .subtask_details
            .into_iter()
            .enumerate()
            .map(|(i, detail)| Subtask {
                label: detail
                    .subtask_name
                    .or_else(|| remote.subtasks.get(i).cloned())
                    .unwrap_or_default(),
                id: SubtaskId(detail.subtask_id),
                completed: Some(detail.is_completed),
            })
            .collect()
    };

    Ok(Task {
        id: TaskId(remote.task_id),
        range,
        name: remote.name,
        column: remote.column as i64,
        subtasks,
        manual_completion: Some(remote.is_completed),
    })
}

fn remote_amount(value: f64, what: &str) -> Result<Amount, DashboardError> {
    Amount::from_f64(value).ok_or_else(|| DashboardError::Source(format!("invalid {what}: {value}")))
}

pub fn transaction_from_remote(remote: RemoteTransaction) -> Result<TransactionRecord, DashboardError> {
    let kind = match remote.transaction_type.as_str() {
        "credit" => TransactionKind::Credit,
        "debit" => TransactionKind::Debit,
        other => {
            return Err(DashboardError::Source(format!(
                "transaction {}: unknown type {other:?}",
                remote.transaction_id
            )));
        }
    };
    Ok(TransactionRecord {
        amount: remote_amount(remote.amount, "amount")?,
        id: remote.transaction_id,
        reason: remote.reason,
        kind,
        timestamp: remote.timestamp,
    })
}

fn summary_from_remote(remote: RemoteSummary) -> Result<LedgerSummary, DashboardError> {
    Ok(LedgerSummary {
        total_credit: remote_amount(remote.total_credit, "total_credit")?,
        total_debit: remote_amount(remote.total_debit, "total_debit")?,
        net_amount: remote_amount(remote.net_amount, "net_amount")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_task_with_details_keeps_ids_and_flags() {
        let remote: RemoteTask = serde_json::from_value(json!({
            "task_id": "t-1",
            "time": "06:00 - 07:00",
            "name": "Morning routine",
            "subtasks": ["stretch", "shower"],
            "column": 1,
            "is_completed": true,
            "subtask_details": [
                {"subtask_id": "s-1", "subtask_name": "stretch", "is_completed": true, "order": 0},
                {"subtask_id": "s-2", "is_completed": false}
            ]
        }))
        .unwrap();

        let task = task_from_remote(remote).unwrap();
        assert_eq!(task.id, TaskId("t-1".into()));
        assert_eq!(task.column, 1);
        assert_eq!(task.manual_completion, Some(true));
        assert_eq!(task.subtasks[0].id, SubtaskId("s-1".into()));
        assert_eq!(task.subtasks[0].completed, Some(true));
        assert_eq!(task.subtasks[1].label, "shower");
    }

    #[test]
    fn remote_task_with_bad_time_is_a_source_error() {
        let remote: RemoteTask = serde_json::from_value(json!({
            "task_id": "t-1", "time": "late", "name": "x", "column": 2.0
        }))
        .unwrap();
        assert!(matches!(task_from_remote(remote), Err(DashboardError::Source(_))));
    }

    #[test]
    fn remote_transactions_convert_to_cents() {
        let remote: RemoteTransaction = serde_json::from_value(json!({
            "transaction_id": "x", "transaction_type": "debit", "reason": "Cab",
            "amount": 95.5, "timestamp": "2026-01-01T10:00:00", "date": "2026-01-01"
        }))
        .unwrap();
        let record = transaction_from_remote(remote).unwrap();
        assert_eq!(record.amount, Amount::from_cents(9_550));
        assert_eq!(record.kind, TransactionKind::Debit);
    }

    #[test]
    fn update_body_uses_remote_field_names() {
        let task = Task {
            id: TaskId("t-9".into()),
            range: parse_range("09:00 - 10:00").unwrap(),
            name: "Read".into(),
            column: 4,
            subtasks: vec![Subtask {
                id: SubtaskId("s".into()),
                label: "chapter 3".into(),
                completed: None,
            }],
            manual_completion: None,
        };
        let body = serde_json::to_value(TaskUpdate::from(&task)).unwrap();
        assert_eq!(
            body,
            json!({
                "task_id": "t-9",
                "task_name": "Read",
                "task_timing": "09:00 - 10:00",
                "residing_column": 4,
                "subtasks": ["chapter 3"]
            })
        );
    }
}
