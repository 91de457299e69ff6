pub mod app;
pub mod completion;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod remote;
pub mod schedule;
pub mod state;
pub mod status;
pub mod storage;
pub mod sync;
pub mod ticker;
pub mod timemath;
pub mod timetable;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_completions;
