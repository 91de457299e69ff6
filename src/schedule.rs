//! The owned task list, its derived view, and the ordering rules between
//! completion toggles and wholesale refreshes.

use crate::completion::{CompletionStore, DateKey, EntityRef, Moment};
use crate::errors::DashboardError;
use crate::models::{
    BoardResponse, ColumnView, Persisted, Subtask, SubtaskId, SubtaskView, Task, TaskId, TaskPatch,
    TaskView,
};
use crate::status::{status_label, TaskStatus};
use crate::timemath::{column_progress, day_progress, format_clock, parse_range};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// A toggle recorded with the model revision it was committed at.
#[derive(Debug, Clone)]
struct Override {
    entity: EntityRef,
    value: bool,
    revision: u64,
}

/// Handed out when a refresh starts and presented when its result lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    seq: u64,
    revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A refresh started later has already been applied.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedToggle {
    pub entity: EntityRef,
    pub value: bool,
}

#[derive(Debug, Default)]
pub struct ScheduleModel {
    tasks: Vec<Task>,
    by_task: HashMap<TaskId, usize>,
    by_subtask: HashMap<SubtaskId, (usize, usize)>,
    revision: u64,
    refresh_seq: u64,
    applied_seq: u64,
    edits: u64,
    overrides: Vec<Override>,
}

impl ScheduleModel {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let mut model = Self::default();
        model.install(tasks);
        model
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.by_task.get(id).map(|&pos| &self.tasks[pos])
    }

    /// The task an entity belongs to: itself, or a subtask's parent.
    pub fn owning_task(&self, entity: &EntityRef) -> Option<&Task> {
        let pos = match entity {
            EntityRef::Task(id) => *self.by_task.get(id)?,
            EntityRef::Subtask(id) => self.by_subtask.get(id)?.0,
        };
        self.tasks.get(pos)
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.refresh_seq += 1;
        RefreshTicket {
            seq: self.refresh_seq,
            revision: self.revision,
        }
    }

    /// Installs a fetched task list. On a source error the previous list is
    /// kept untouched. Toggles committed after the ticket was issued are
    /// replayed on top of the fetched list.
    pub fn load_tasks(
        &mut self,
        ticket: RefreshTicket,
        source: Result<Vec<Task>, DashboardError>,
    ) -> Result<LoadOutcome, DashboardError> {
        let tasks = source?;
        if ticket.seq < self.applied_seq {
            debug!(seq = ticket.seq, applied = self.applied_seq, "dropping stale schedule refresh");
            return Ok(LoadOutcome::Stale);
        }

        warn_on_overlaps(&tasks);
        self.install(tasks);
        self.applied_seq = ticket.seq;
        self.overrides.retain(|o| o.revision > ticket.revision);

        let replay: Vec<_> = self
            .overrides
            .iter()
            .map(|o| (o.entity.clone(), o.value))
            .collect();
        for (entity, value) in replay {
            if let Some(slot) = self.payload_slot(&entity) {
                if slot.is_some() {
                    *slot = Some(value);
                }
            }
        }

        info!(tasks = self.tasks.len(), replayed = self.overrides.len(), "schedule loaded");
        Ok(LoadOutcome::Applied)
    }

    fn install(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.reindex();
    }

    fn reindex(&mut self) {
        self.by_task.clear();
        self.by_subtask.clear();
        for (pos, task) in self.tasks.iter().enumerate() {
            self.by_task.insert(task.id.clone(), pos);
            for (sub_pos, subtask) in task.subtasks.iter().enumerate() {
                self.by_subtask.insert(subtask.id.clone(), (pos, sub_pos));
            }
        }
    }

    fn payload_slot(&mut self, entity: &EntityRef) -> Option<&mut Option<bool>> {
        match entity {
            EntityRef::Task(id) => {
                let pos = *self.by_task.get(id)?;
                Some(&mut self.tasks[pos].manual_completion)
            }
            EntityRef::Subtask(id) => {
                let (pos, sub_pos) = *self.by_subtask.get(id)?;
                Some(&mut self.tasks[pos].subtasks[sub_pos].completed)
            }
        }
    }

    fn payload(&self, entity: &EntityRef) -> Option<Option<bool>> {
        match entity {
            EntityRef::Task(id) => {
                let &pos = self.by_task.get(id)?;
                Some(self.tasks[pos].manual_completion)
            }
            EntityRef::Subtask(id) => {
                let &(pos, sub_pos) = self.by_subtask.get(id)?;
                Some(self.tasks[pos].subtasks[sub_pos].completed)
            }
        }
    }

    /// Works out the flipped value without changing anything.
    pub fn plan_toggle(
        &self,
        entity: EntityRef,
        date_key: &DateKey,
        store: &impl CompletionStore,
    ) -> Result<PlannedToggle, DashboardError> {
        let payload = self.payload(&entity).ok_or_else(|| match &entity {
            EntityRef::Task(id) => DashboardError::UnknownTask(id.to_string()),
            EntityRef::Subtask(id) => DashboardError::UnknownSubtask(id.to_string()),
        })?;
        let current = payload.unwrap_or_else(|| store.get(date_key, &entity));
        Ok(PlannedToggle {
            entity,
            value: !current,
        })
    }

    /// Applies a toggle once it has been persisted somewhere. Values that came
    /// from the source payload are updated in memory; locally persisted flags
    /// for payload-less entities live only in the local store, which the
    /// caller writes.
    ///
    /// An override is only kept while a refresh is in flight, and only the
    /// newest one per entity.
    pub fn commit_toggle(&mut self, planned: &PlannedToggle, persisted: Persisted) {
        if let Some(slot) = self.payload_slot(&planned.entity) {
            if persisted == Persisted::Remote || slot.is_some() {
                *slot = Some(planned.value);
            }
        }
        self.revision += 1;
        if self.refresh_seq == self.applied_seq {
            return;
        }
        self.overrides.retain(|o| o.entity != planned.entity);
        self.overrides.push(Override {
            entity: planned.entity.clone(),
            value: planned.value,
            revision: self.revision,
        });
    }

    /// Flips a task's completion with no remote involved.
    pub fn toggle_task_completion(
        &mut self,
        id: &TaskId,
        date_key: &DateKey,
        store: &mut impl CompletionStore,
    ) -> Result<bool, DashboardError> {
        self.toggle_locally(EntityRef::Task(id.clone()), date_key, store)
    }

    /// Flips a subtask's completion with no remote involved.
    pub fn toggle_subtask_completion(
        &mut self,
        id: &SubtaskId,
        date_key: &DateKey,
        store: &mut impl CompletionStore,
    ) -> Result<bool, DashboardError> {
        self.toggle_locally(EntityRef::Subtask(id.clone()), date_key, store)
    }

    fn toggle_locally(
        &mut self,
        entity: EntityRef,
        date_key: &DateKey,
        store: &mut impl CompletionStore,
    ) -> Result<bool, DashboardError> {
        let planned = self.plan_toggle(entity, date_key, store)?;
        store.set(date_key, &planned.entity, planned.value);
        self.commit_toggle(&planned, Persisted::Local);
        Ok(planned.value)
    }

    /// Validates a patch against the current task and returns the edited
    /// copy. Nothing is applied.
    pub fn prepare_update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, DashboardError> {
        let &pos = self
            .by_task
            .get(id)
            .ok_or_else(|| DashboardError::UnknownTask(id.to_string()))?;
        let mut task = self.tasks[pos].clone();

        if let Some(name) = &patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DashboardError::Validation("task name must not be empty".into()));
            }
            task.name = name.to_string();
        }

        if let Some(time) = &patch.time {
            task.range = parse_range(time.trim()).map_err(|err| match err {
                DashboardError::Format(msg) => DashboardError::Validation(msg),
                other => other,
            })?;
        }

        if let Some(column) = patch.column {
            task.column = column;
        }

        if let Some(labels) = &patch.subtasks {
            let mut subtasks = Vec::with_capacity(labels.len());
            for (i, label) in labels.iter().enumerate() {
                let label = label.trim();
                if label.is_empty() {
                    return Err(DashboardError::Validation(format!("subtask {} is empty", i + 1)));
                }
                match task.subtasks.get(i) {
                    Some(existing) if existing.label == label => subtasks.push(existing.clone()),
                    _ => subtasks.push(Subtask {
                        id: SubtaskId(format!("{}-{}-e{}", task.id, i, self.edits + 1)),
                        label: label.to_string(),
                        completed: None,
                    }),
                }
            }
            task.subtasks = subtasks;
        }

        Ok(task)
    }

    /// Swaps an edited task into its existing slot. Order is untouched, and
    /// completion flags come from the slot, not from the edited copy, so
    /// toggles committed since `prepare_update` are kept.
    pub fn replace_task(&mut self, mut task: Task) -> Result<(), DashboardError> {
        let &pos = self
            .by_task
            .get(&task.id)
            .ok_or_else(|| DashboardError::UnknownTask(task.id.to_string()))?;
        let current = &self.tasks[pos];
        task.manual_completion = current.manual_completion;
        for subtask in &mut task.subtasks {
            if let Some(existing) = current.subtasks.iter().find(|s| s.id == subtask.id) {
                subtask.completed = existing.completed;
            }
        }
        self.tasks[pos] = task;
        self.edits += 1;
        self.reindex();
        Ok(())
    }

    pub fn update_task(&mut self, id: &TaskId, patch: &TaskPatch) -> Result<&Task, DashboardError> {
        let task = self.prepare_update(id, patch)?;
        self.replace_task(task)?;
        self.task(id)
            .ok_or_else(|| DashboardError::UnknownTask(id.to_string()))
    }

    pub fn view(&self, moment: &Moment, store: &impl CompletionStore) -> Vec<TaskView> {
        derive_view(&self.tasks, moment.minutes, &moment.date_key, store)
    }
}

/// Status and completion for every task and subtask. Depends only on its
/// arguments.
pub fn derive_view(
    tasks: &[Task],
    now: u32,
    date_key: &DateKey,
    store: &impl CompletionStore,
) -> Vec<TaskView> {
    tasks
        .iter()
        .map(|task| task_view(task, now, date_key, store))
        .collect()
}

pub fn task_view(task: &Task, now: u32, date_key: &DateKey, store: &impl CompletionStore) -> TaskView {
    let status = TaskStatus::resolve(task.range, now);
    let completed = task
        .manual_completion
        .unwrap_or_else(|| store.get(date_key, &EntityRef::Task(task.id.clone())));

    let subtasks = task
        .subtasks
        .iter()
        .map(|subtask| SubtaskView {
            id: subtask.id.clone(),
            label: subtask.label.clone(),
            completed: subtask
                .completed
                .unwrap_or_else(|| store.get(date_key, &EntityRef::Subtask(subtask.id.clone()))),
        })
        .collect();

    TaskView {
        id: task.id.clone(),
        time: task.range,
        name: task.name.clone(),
        column: task.column,
        status,
        label: status_label(completed, status),
        completed,
        subtasks,
    }
}

/// Groups the view by column. A column's progress spans from its first
/// task's start to its last task's end, in list order.
pub fn build_board(
    tasks: &[Task],
    moment: &Moment,
    day_start: u32,
    day_end: u32,
    store: &impl CompletionStore,
) -> BoardResponse {
    let mut columns: BTreeMap<i64, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        columns.entry(task.column).or_default().push(task);
    }

    let columns = columns
        .into_iter()
        .map(|(column, lane)| {
            let progress = match (lane.first(), lane.last()) {
                (Some(first), Some(last)) => {
                    column_progress(moment.minutes, first.range.start, last.range.end)
                }
                _ => 0.0,
            };
            ColumnView {
                column,
                progress,
                tasks: lane
                    .into_iter()
                    .map(|task| task_view(task, moment.minutes, &moment.date_key, store))
                    .collect(),
            }
        })
        .collect();

    BoardResponse {
        date_key: moment.date_key.to_string(),
        now: format_clock(moment.minutes),
        day_progress: day_progress(moment.minutes, day_start, day_end),
        columns,
    }
}

fn warn_on_overlaps(tasks: &[Task]) {
    let mut lanes: BTreeMap<i64, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        lanes.entry(task.column).or_default().push(task);
    }
    for (column, mut lane) in lanes {
        lane.sort_by_key(|task| task.range.start);
        for pair in lane.windows(2) {
            if pair[1].range.start < pair[0].range.end {
                warn!(column, first = %pair[0].id, second = %pair[1].id, "overlapping tasks in column");
            }
        }
    }
}
