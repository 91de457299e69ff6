//! Built-in timetable used when no remote endpoint is configured.

use crate::errors::DashboardError;
use crate::models::{Subtask, SubtaskId, Task, TaskId};
use crate::timemath::parse_range;

struct Entry {
    time: &'static str,
    name: &'static str,
    column: i64,
    subtasks: &'static [&'static str],
}

const TIMETABLE: &[Entry] = &[
    Entry { time: "05:50 - 06:30", name: "Wake up & hydrate", column: 1, subtasks: &["Glass of water", "Make bed"] },
    Entry { time: "06:30 - 07:30", name: "Workout", column: 1, subtasks: &["Warm-up", "Strength", "Stretch"] },
    Entry { time: "07:30 - 08:15", name: "Breakfast & shower", column: 1, subtasks: &[] },
    Entry { time: "08:15 - 09:00", name: "Plan the day", column: 1, subtasks: &["Review calendar", "Pick top 3 tasks"] },
    Entry { time: "09:00 - 11:00", name: "Deep work block", column: 2, subtasks: &["Phone on silent"] },
    Entry { time: "11:00 - 11:15", name: "Break", column: 2, subtasks: &[] },
    Entry { time: "11:15 - 13:00", name: "Deep work block", column: 2, subtasks: &[] },
    Entry { time: "13:00 - 13:45", name: "Lunch", column: 3, subtasks: &[] },
    Entry { time: "13:45 - 14:15", name: "Walk", column: 3, subtasks: &[] },
    Entry { time: "14:15 - 16:30", name: "Meetings & email", column: 3, subtasks: &["Inbox zero"] },
    Entry { time: "16:30 - 18:00", name: "Learning", column: 4, subtasks: &["Read 20 pages", "Practice"] },
    Entry { time: "18:00 - 19:00", name: "Dinner", column: 4, subtasks: &[] },
    Entry { time: "19:00 - 20:30", name: "Side project", column: 4, subtasks: &[] },
    Entry { time: "20:30 - 21:30", name: "Family time", column: 5, subtasks: &[] },
    Entry { time: "21:30 - 22:30", name: "Wind down", column: 5, subtasks: &["Journal", "Prepare tomorrow"] },
    Entry { time: "22:30 - 23:10", name: "Sleep prep", column: 5, subtasks: &[] },
];

/// Tasks get positional ids, `task_<index>` and `subtask-<index>-<sub>`.
pub fn static_schedule() -> Result<Vec<Task>, DashboardError> {
    TIMETABLE
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            Ok(Task {
                id: TaskId(format!("task_{index}")),
                range: parse_range(entry.time)?,
                name: entry.name.to_string(),
                column: entry.column,
                subtasks: entry
                    .subtasks
                    .iter()
                    .enumerate()
                    .map(|(sub, label)| Subtask {
                        id: SubtaskId(format!("subtask-{index}-{sub}")),
                        label: label.to_string(),
                        completed: None,
                    })
                    .collect(),
                manual_completion: None,
            })
        })
        .collect()
}
