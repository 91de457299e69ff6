use crate::completion::Moment;
use crate::errors::AppError;
use crate::models::{
    BoardResponse, EntryRequest, LedgerResponse, SubtaskId, TaskId, TaskPatch, TaskView,
    ToggleResponse,
};
use crate::schedule::LoadOutcome;
use crate::state::AppState;
use crate::sync;
use crate::timemath::day_progress;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let moment = Moment::now();
    let progress = day_progress(moment.minutes, state.config.day_start, state.config.day_end);
    Html(render_index(moment.date_key.as_str(), progress, state.remote.is_some()))
}

pub async fn get_board(State(state): State<AppState>) -> Json<BoardResponse> {
    Json(sync::board(&state, &Moment::now()).await)
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>, AppError> {
    let moment = Moment::now();
    let response = sync::toggle_task_completion(&state, TaskId(id), &moment).await?;
    Ok(Json(response))
}

pub async fn toggle_subtask(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>, AppError> {
    let moment = Moment::now();
    let response = sync::toggle_subtask_completion(&state, SubtaskId(id), &moment).await?;
    Ok(Json(response))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<TaskView>, AppError> {
    let moment = Moment::now();
    let view = sync::update_task(&state, TaskId(id), patch, &moment).await?;
    Ok(Json(view))
}

pub async fn refresh_schedule(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    match sync::refresh_schedule(&state).await? {
        LoadOutcome::Applied => Ok(StatusCode::NO_CONTENT),
        LoadOutcome::Stale => Ok(StatusCode::ACCEPTED),
    }
}

pub async fn get_ledger(State(state): State<AppState>) -> Json<LedgerResponse> {
    Json(sync::ledger(&state).await)
}

pub async fn add_entry(
    State(state): State<AppState>,
    Json(payload): Json<EntryRequest>,
) -> Result<Json<LedgerResponse>, AppError> {
    if payload.text.trim().is_empty() {
        return Err(AppError::bad_request("text is required"));
    }
    let ledger = sync::add_entry(&state, &payload.text).await?;
    Ok(Json(ledger))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LedgerResponse>, AppError> {
    let ledger = sync::delete_entry(&state, &id).await?;
    Ok(Json(ledger))
}
