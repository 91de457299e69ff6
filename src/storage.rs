use crate::completion::DayCompletions;
use crate::errors::DashboardError;
use std::path::Path;
use tokio::fs;
use tracing::error;

/// Reads the local completion file. A missing file is an empty store; an
/// unreadable or corrupt one is logged and treated the same.
pub async fn load_completions(path: &Path) -> DayCompletions {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse completion file: {err}");
                DayCompletions::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => DayCompletions::default(),
        Err(err) => {
            error!("failed to read completion file: {err}");
            DayCompletions::default()
        }
    }
}

pub async fn persist_completions(path: &Path, data: &DayCompletions) -> Result<(), DashboardError> {
    let payload = serde_json::to_vec_pretty(data)
        .map_err(|err| DashboardError::Io(std::io::Error::other(err)))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CompletionStore, DateKey, EntityRef};
    use crate::models::TaskId;
    use chrono::NaiveDate;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("day_dashboard_{name}_{}_{nanos}.json", std::process::id()))
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let data = load_completions(&temp_path("missing")).await;
        assert!(data.days.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let path = temp_path("corrupt");
        fs::write(&path, b"{not json").await.unwrap();
        assert!(load_completions(&path).await.days.is_empty());
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn persisted_completions_load_back() {
        let path = temp_path("roundtrip");
        let mut data = DayCompletions::default();
        let day = DateKey::for_date(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
        let task = EntityRef::Task(TaskId("task_2".into()));
        data.set(&day, &task, true);

        persist_completions(&path, &data).await.unwrap();
        let loaded = load_completions(&path).await;
        assert!(loaded.get(&day, &task));
        let _ = fs::remove_file(&path).await;
    }
}
