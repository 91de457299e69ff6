//! Background timers: the per-second clock tick and the periodic refetches.

use crate::completion::{DateKey, Moment};
use crate::models::{TaskId, TaskView};
use crate::state::AppState;
use crate::status::TaskStatus;
use crate::sync;
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Lets work through only when the wall-clock minute has moved.
#[derive(Debug, Default)]
pub struct MinuteGate {
    last: Option<(DateKey, u32)>,
}

impl MinuteGate {
    pub fn advance(&mut self, moment: &Moment) -> bool {
        let current = (moment.date_key.clone(), moment.minutes);
        if self.last.as_ref() == Some(&current) {
            return false;
        }
        self.last = Some(current);
        true
    }
}

/// Remembers each task's last status to report transitions.
#[derive(Debug, Default)]
pub struct StatusTracker {
    seen: HashMap<TaskId, TaskStatus>,
}

impl StatusTracker {
    /// Tasks whose status differs from the previous observation. The first
    /// observation of a task is not a transition.
    pub fn transitions(&mut self, views: &[TaskView]) -> Vec<(TaskId, TaskStatus)> {
        let mut changed = Vec::new();
        let mut seen = HashMap::with_capacity(views.len());
        for view in views {
            if let Some(&previous) = self.seen.get(&view.id) {
                if previous != view.status {
                    changed.push((view.id.clone(), view.status));
                }
            }
            seen.insert(view.id.clone(), view.status);
        }
        self.seen = seen;
        changed
    }
}

pub fn spawn_minute_ticker(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = interval(Duration::from_secs(1));
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut gate = MinuteGate::default();
        let mut tracker = StatusTracker::default();

        loop {
            ticks.tick().await;
            let moment = Moment::now();
            if !gate.advance(&moment) {
                continue;
            }

            let views = {
                let schedule = state.schedule.lock().await;
                let completions = state.completions.lock().await;
                schedule.view(&moment, &*completions)
            };
            for (id, status) in tracker.transitions(&views) {
                if let Some(view) = views.iter().find(|view| view.id == id) {
                    info!(task = %id, name = %view.name, ?status, "task status changed");
                }
            }
            debug!(minute = moment.minutes, "minute tick");
        }
    })
}

pub fn spawn_schedule_refresher(state: AppState) -> JoinHandle<()> {
    let period = state.config.schedule_refresh;
    tokio::spawn(async move {
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticks.tick().await;
        loop {
            ticks.tick().await;
            if let Err(err) = sync::refresh_schedule(&state).await {
                warn!("scheduled schedule refresh failed, keeping previous tasks: {err}");
            }
        }
    })
}

pub fn spawn_ledger_refresher(state: AppState) -> JoinHandle<()> {
    let period = state.config.ledger_refresh;
    tokio::spawn(async move {
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticks.tick().await;
        loop {
            ticks.tick().await;
            if let Err(err) = sync::refresh_ledger(&state).await {
                warn!("scheduled ledger refresh failed, keeping previous ledger: {err}");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::status_label;
    use crate::timemath::parse_range;
    use chrono::NaiveDate;

    fn moment(day: u32, minutes: u32) -> Moment {
        Moment {
            date_key: DateKey::for_date(NaiveDate::from_ymd_opt(2026, 3, day).unwrap()),
            minutes,
        }
    }

    fn view(id: &str, status: TaskStatus) -> TaskView {
        TaskView {
            id: TaskId(id.into()),
            time: parse_range("09:00 - 10:00").unwrap(),
            name: id.into(),
            column: 1,
            status,
            label: status_label(false, status),
            completed: false,
            subtasks: Vec::new(),
        }
    }

    #[test]
    fn gate_opens_once_per_minute() {
        let mut gate = MinuteGate::default();
        assert!(gate.advance(&moment(14, 600)));
        assert!(!gate.advance(&moment(14, 600)));
        assert!(gate.advance(&moment(14, 601)));
        assert!(gate.advance(&moment(15, 601)));
    }

    #[test]
    fn tracker_reports_only_changes() {
        let mut tracker = StatusTracker::default();
        assert!(tracker.transitions(&[view("a", TaskStatus::Upcoming)]).is_empty());
        assert!(tracker.transitions(&[view("a", TaskStatus::Upcoming)]).is_empty());
        assert_eq!(
            tracker.transitions(&[view("a", TaskStatus::Current), view("b", TaskStatus::Current)]),
            vec![(TaskId("a".into()), TaskStatus::Current)]
        );
    }
}
