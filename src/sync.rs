//! Operations that combine the in-memory models with the remote collaborator
//! and the local fallback file.
//!
//! No lock is held across a network call. Each model update happens under a
//! single lock acquisition, so a render never sees half of it.

use crate::completion::{push_or_fallback, CompletionStore, EntityRef, Moment};
use crate::errors::DashboardError;
use crate::ledger::parse_entry;
use crate::models::{
    BoardResponse, LedgerResponse, Persisted, SubtaskId, TaskId, TaskPatch, TaskView,
    ToggleResponse,
};
use crate::schedule::{build_board, task_view, LoadOutcome};
use crate::state::AppState;
use crate::storage::persist_completions;
use crate::timetable::static_schedule;
use tracing::{error, info, warn};

/// Re-reads the task list from the active source and installs it.
pub async fn refresh_schedule(state: &AppState) -> Result<LoadOutcome, DashboardError> {
    let ticket = state.schedule.lock().await.begin_refresh();
    let fetched = match &state.remote {
        Some(remote) => remote.fetch_schedule().await,
        None => static_schedule(),
    };
    state.schedule.lock().await.load_tasks(ticket, fetched)
}

pub async fn board(state: &AppState, moment: &Moment) -> BoardResponse {
    let schedule = state.schedule.lock().await;
    let completions = state.completions.lock().await;
    build_board(
        schedule.tasks(),
        moment,
        state.config.day_start,
        state.config.day_end,
        &*completions,
    )
}

pub async fn toggle_task_completion(
    state: &AppState,
    id: TaskId,
    moment: &Moment,
) -> Result<ToggleResponse, DashboardError> {
    toggle(state, EntityRef::Task(id), moment).await
}

pub async fn toggle_subtask_completion(
    state: &AppState,
    id: SubtaskId,
    moment: &Moment,
) -> Result<ToggleResponse, DashboardError> {
    toggle(state, EntityRef::Subtask(id), moment).await
}

/// Remote first; on any remote failure the flip lands in the local store so
/// the visible state always changes. Toggles of the same entity run one at a
/// time, so each one plans from the value the previous one committed.
async fn toggle(
    state: &AppState,
    entity: EntityRef,
    moment: &Moment,
) -> Result<ToggleResponse, DashboardError> {
    let entity_lock = state.entity_lock(&entity).await;
    let _serial = entity_lock.lock().await;

    let planned = {
        let schedule = state.schedule.lock().await;
        let completions = state.completions.lock().await;
        schedule.plan_toggle(entity, &moment.date_key, &*completions)?
    };

    let persisted = push_or_fallback(state.remote.as_ref(), &planned.entity, planned.value).await;

    let task = {
        let mut schedule = state.schedule.lock().await;
        let mut completions = state.completions.lock().await;
        if persisted == Persisted::Local {
            completions.set(&moment.date_key, &planned.entity, planned.value);
        }
        schedule.commit_toggle(&planned, persisted);

        schedule
            .owning_task(&planned.entity)
            .map(|task| task_view(task, moment.minutes, &moment.date_key, &*completions))
            .ok_or_else(|| match &planned.entity {
                EntityRef::Task(id) => DashboardError::UnknownTask(id.to_string()),
                EntityRef::Subtask(id) => DashboardError::UnknownSubtask(id.to_string()),
            })?
    };

    if persisted == Persisted::Local {
        // Snapshot under the write lock so a later write never carries older data.
        let _write = state.persist.lock().await;
        let snapshot = state.completions.lock().await.clone();
        if let Err(err) = persist_completions(&state.config.data_path, &snapshot).await {
            error!("failed to persist local completions: {err}");
        }
    }

    info!(entity = %planned.entity, value = planned.value, ?persisted, "completion toggled");
    Ok(ToggleResponse { persisted, task })
}

/// Validates, pushes to the remote when there is one, then swaps the task in
/// place. A rejected or failed edit changes nothing.
pub async fn update_task(
    state: &AppState,
    id: TaskId,
    patch: TaskPatch,
    moment: &Moment,
) -> Result<TaskView, DashboardError> {
    let edited = state.schedule.lock().await.prepare_update(&id, &patch)?;

    if let Some(remote) = &state.remote {
        remote.update_task(&edited).await?;
    }

    state.schedule.lock().await.replace_task(edited)?;
    info!(task = %id, "task updated");

    // The remote hands out fresh subtask ids on every edit.
    if state.remote.is_some() {
        if let Err(err) = refresh_schedule(state).await {
            warn!("refresh after task edit failed: {err}");
        }
    }

    let schedule = state.schedule.lock().await;
    let completions = state.completions.lock().await;
    schedule
        .task(&id)
        .map(|task| task_view(task, moment.minutes, &moment.date_key, &*completions))
        .ok_or_else(|| DashboardError::UnknownTask(id.to_string()))
}

pub async fn refresh_ledger(state: &AppState) -> Result<(), DashboardError> {
    let remote = state.remote.as_ref().ok_or(DashboardError::NoRemote)?;
    let date = state
        .config
        .ledger_today_only
        .then(|| Moment::now().date_key.to_string());
    let (records, server_summary) = remote.fetch_transactions(date.as_deref()).await?;

    let count = records.len();
    state.ledger.lock().await.replace(records, server_summary);
    info!(transactions = count, "ledger loaded");
    Ok(())
}

pub async fn ledger(state: &AppState) -> LedgerResponse {
    let ledger = state.ledger.lock().await;
    LedgerResponse {
        transactions: ledger.records().to_vec(),
        summary: ledger.summary(),
        summary_check: ledger.check(),
    }
}

/// Parses the text, records it remotely, then refetches: the remote's id and
/// timestamp are authoritative, so nothing is appended locally.
pub async fn add_entry(state: &AppState, text: &str) -> Result<LedgerResponse, DashboardError> {
    let entry = parse_entry(text)?;
    let remote = state.remote.as_ref().ok_or(DashboardError::NoRemote)?;
    remote.add_transaction(&entry.to_wire_text()).await?;
    info!(reason = %entry.reason, amount = %entry.amount, kind = ?entry.kind, "transaction added");

    refresh_ledger(state).await?;
    Ok(ledger(state).await)
}

pub async fn delete_entry(state: &AppState, id: &str) -> Result<LedgerResponse, DashboardError> {
    let remote = state.remote.as_ref().ok_or(DashboardError::NoRemote)?;
    remote.delete_transaction(id).await?;
    info!(transaction = id, "transaction deleted");

    refresh_ledger(state).await?;
    Ok(ledger(state).await)
}
