//! Per-day completion flags and the remote-first persistence strategy.

use crate::errors::DashboardError;
use crate::models::{Persisted, SubtaskId, TaskId};
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use tracing::{debug, warn};

/// Names one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(String);

impl DateKey {
    pub fn for_date(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wall-clock reading taken once and passed down, so a toggle near midnight
/// keeps the day it was issued on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moment {
    pub date_key: DateKey,
    pub minutes: u32,
}

impl Moment {
    pub fn now() -> Self {
        Self::at(Local::now().naive_local())
    }

    pub fn at(at: NaiveDateTime) -> Self {
        Self {
            date_key: DateKey::for_date(at.date()),
            minutes: at.hour() * 60 + at.minute(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Task(TaskId),
    Subtask(SubtaskId),
}

impl EntityRef {
    fn storage_key(&self) -> String {
        match self {
            EntityRef::Task(id) => format!("task:{id}"),
            EntityRef::Subtask(id) => format!("subtask:{id}"),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

pub trait CompletionStore {
    /// Absent records read as `false`.
    fn get(&self, date_key: &DateKey, entity: &EntityRef) -> bool;

    fn set(&mut self, date_key: &DateKey, entity: &EntityRef, value: bool);
}

/// Local fallback store: `date_key -> entity -> flag`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayCompletions {
    pub days: BTreeMap<String, BTreeMap<String, bool>>,
}

impl CompletionStore for DayCompletions {
    fn get(&self, date_key: &DateKey, entity: &EntityRef) -> bool {
        self.days
            .get(date_key.as_str())
            .and_then(|day| day.get(&entity.storage_key()))
            .copied()
            .unwrap_or(false)
    }

    fn set(&mut self, date_key: &DateKey, entity: &EntityRef, value: bool) {
        self.days
            .entry(date_key.as_str().to_string())
            .or_default()
            .insert(entity.storage_key(), value);
    }
}

/// Remote side of completion persistence.
pub trait RemoteCompletion {
    fn push(
        &self,
        entity: &EntityRef,
        value: bool,
    ) -> impl Future<Output = Result<(), DashboardError>> + Send;
}

/// Tries the remote first. Any failure degrades to local persistence, which
/// the caller then performs; the two stores are never reconciled.
pub async fn push_or_fallback<R: RemoteCompletion>(
    remote: Option<&R>,
    entity: &EntityRef,
    value: bool,
) -> Persisted {
    let Some(remote) = remote else {
        debug!(%entity, "no remote configured, completion kept locally");
        return Persisted::Local;
    };

    match remote.push(entity, value).await {
        Ok(()) => Persisted::Remote,
        Err(err) => {
            warn!(%entity, "remote completion update failed, falling back to local: {err}");
            Persisted::Local
        }
    }
}
