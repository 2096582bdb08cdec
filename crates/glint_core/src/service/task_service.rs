//! Task use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD and scheduling entry points for core callers.
//! - Delegate persistence to repository implementations and projection to
//!   the pure schedule functions.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - The service never reads a clock; `now` and window bounds are always
//!   caller-supplied, keeping every call deterministic.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::info;
use std::collections::BTreeMap;

use crate::model::advice::FrequencyAdvice;
use crate::model::task::{Recurrence, Task, TaskCategory, TaskId};
use crate::repo::task_repo::{RepoError, RepoResult, TaskListQuery, TaskRepository};
use crate::schedule::{complete_now, next_occurrence, occurrences_in_range};

/// Tasks due on one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct DueDay {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
}

/// Use-case service wrapper for task CRUD and scheduling.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a new task through repository persistence.
    pub fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        self.repo.create_task(task)
    }

    /// Creates a recurring routine task.
    ///
    /// # Contract
    /// - The task starts active with no completion history.
    /// - Returns the created stable task ID.
    pub fn create_routine(
        &self,
        name: impl Into<String>,
        category: TaskCategory,
        recurrence: Recurrence,
    ) -> RepoResult<TaskId> {
        let mut task = Task::new(name, category);
        task.recurrence = Some(recurrence);
        self.repo.create_task(&task)
    }

    /// Updates an existing task by stable ID.
    ///
    /// Returns repository-level not-found or validation errors unchanged.
    pub fn update_task(&self, task: &Task) -> RepoResult<()> {
        self.repo.update_task(task)
    }

    /// Gets one task by ID with optional deleted-row visibility.
    pub fn get_task(&self, id: TaskId, include_deleted: bool) -> RepoResult<Option<Task>> {
        self.repo.get_task(id, include_deleted)
    }

    /// Lists tasks using filter and pagination options.
    pub fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(query)
    }

    /// Soft-deletes a task by ID.
    pub fn soft_delete_task(&self, id: TaskId) -> RepoResult<()> {
        self.repo.soft_delete_task(id)
    }

    /// Records a completion event for a task and persists the transition.
    ///
    /// # Contract
    /// - `last_done_at` becomes `now`; `next_due_at` is recomputed from the
    ///   shifted anchor and becomes absent when the recurrence bounds are
    ///   exhausted.
    /// - Each call is a distinct completion event; repeating it with the
    ///   same `now` advances the anchor again.
    pub fn mark_task_done(&self, id: TaskId, now: DateTime<Utc>) -> RepoResult<Task> {
        let task = self
            .repo
            .get_task(id, false)?
            .ok_or(RepoError::NotFound(id))?;

        let updated = complete_now(&task, now);
        self.repo.update_task(&updated)?;
        info!(
            "event=task_completed module=service status=ok task={} next_due={:?}",
            id, updated.next_due_at
        );
        Ok(updated)
    }

    /// Groups due tasks per date over an `days`-day horizon from `start`.
    ///
    /// Dates with no due task are omitted; the result is ascending by date.
    pub fn upcoming_occurrences(&self, start: NaiveDate, days: u32) -> RepoResult<Vec<DueDay>> {
        let end = start + Duration::days(i64::from(days));
        let query = TaskListQuery {
            active_only: true,
            ..TaskListQuery::default()
        };

        let mut by_date: BTreeMap<NaiveDate, Vec<Task>> = BTreeMap::new();
        for task in self.repo.list_tasks(&query)? {
            for date in occurrences_in_range(&task, start, end) {
                by_date.entry(date).or_default().push(task.clone());
            }
        }

        Ok(by_date
            .into_iter()
            .map(|(date, tasks)| DueDay { date, tasks })
            .collect())
    }

    /// Returns the tasks that have an occurrence on `date`.
    pub fn tasks_due_on(&self, date: NaiveDate) -> RepoResult<Vec<Task>> {
        let query = TaskListQuery {
            active_only: true,
            ..TaskListQuery::default()
        };

        let due = self
            .repo
            .list_tasks(&query)?
            .into_iter()
            .filter(|task| !occurrences_in_range(task, date, date).is_empty())
            .collect();
        Ok(due)
    }

    /// Returns the next due date of one task on or after `from`.
    ///
    /// `None` when the task does not exist, has no recurrence, is inactive,
    /// or its bounds are exhausted.
    pub fn next_due(&self, id: TaskId, from: NaiveDate) -> RepoResult<Option<NaiveDate>> {
        let Some(task) = self.repo.get_task(id, false)? else {
            return Ok(None);
        };
        Ok(next_occurrence(&task, from))
    }

    /// Applies a suggested recurrence interval to a task and persists it.
    ///
    /// Advice is treated exactly like a manual edit: the existing rule keeps
    /// its anchor and bounds, and a task without a rule gets an unbounded
    /// one. Validation still applies on write.
    pub fn apply_frequency_advice(
        &self,
        id: TaskId,
        advice: &FrequencyAdvice,
    ) -> RepoResult<Task> {
        let mut task = self
            .repo
            .get_task(id, false)?
            .ok_or(RepoError::NotFound(id))?;

        match task.recurrence.as_mut() {
            Some(recurrence) => {
                let rule = recurrence.rule_mut();
                rule.every = advice.every;
                rule.unit = advice.unit;
            }
            None => {
                task.recurrence = Some(Recurrence::interval(advice.every, advice.unit));
            }
        }

        self.repo.update_task(&task)?;
        Ok(task)
    }
}
