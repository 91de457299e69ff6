use crate::completion::{DayCompletions, EntityRef};
use crate::config::Config;
use crate::ledger::Ledger;
use crate::remote::RemoteClient;
use crate::schedule::ScheduleModel;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handles. Locks are always taken schedule first, then completions.
/// A toggle holds its entity's lock from planning to commit, so flips of the
/// same entity never interleave. `persist` orders writes of the local file.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub remote: Option<RemoteClient>,
    pub schedule: Arc<Mutex<ScheduleModel>>,
    pub completions: Arc<Mutex<DayCompletions>>,
    pub ledger: Arc<Mutex<Ledger>>,
    pub persist: Arc<Mutex<()>>,
    toggle_locks: Arc<Mutex<HashMap<EntityRef, Arc<Mutex<()>>>>>,
}

impl AppState {
    pub fn new(config: Config, remote: Option<RemoteClient>, completions: DayCompletions) -> Self {
        Self {
            config: Arc::new(config),
            remote,
            schedule: Arc::new(Mutex::new(ScheduleModel::default())),
            completions: Arc::new(Mutex::new(completions)),
            ledger: Arc::new(Mutex::new(Ledger::default())),
            persist: Arc::new(Mutex::new(())),
            toggle_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The lock serializing toggles of one task or subtask.
    pub async fn entity_lock(&self, entity: &EntityRef) -> Arc<Mutex<()>> {
        let mut locks = self.toggle_locks.lock().await;
        Arc::clone(locks.entry(entity.clone()).or_default())
    }
}
