use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/board", get(handlers::get_board))
        .route("/api/tasks/:id", put(handlers::update_task))
        .route("/api/tasks/:id/toggle", post(handlers::toggle_task))
        .route("/api/subtasks/:id/toggle", post(handlers::toggle_subtask))
        .route("/api/schedule/refresh", post(handlers::refresh_schedule))
        .route("/api/ledger", get(handlers::get_ledger).post(handlers::add_entry))
        .route("/api/ledger/:id", axum::routing::delete(handlers::delete_entry))
        .with_state(state)
}
