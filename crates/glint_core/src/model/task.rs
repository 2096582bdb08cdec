//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record shared by schedule/store layers.
//! - Provide lifecycle helpers for soft-delete semantics.
//! - Validate caller-supplied recurrence rules at the model boundary.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another task.
//! - `is_deleted` is the source of truth for tombstone state.
//! - `next_due_at` is a cached convenience value; the schedule layer always
//!   recomputes from `last_done_at`/`anchor_date` and never trusts it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Unit of the recurrence step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyUnit {
    Days,
    Weeks,
    Months,
}

/// Fixed-interval recurrence parameters.
///
/// `every` is a positive real number; fractional values are meaningful and
/// are resolved to a whole-day step by the schedule layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalRule {
    /// Magnitude of the step, in `unit`s.
    pub every: f64,
    /// Unit the step is expressed in.
    pub unit: FrequencyUnit,
    /// Reference date for the first occurrence when no completion exists.
    pub anchor_date: Option<NaiveDate>,
    /// Hard cap on total occurrences generated from the anchor.
    pub count: Option<u32>,
    /// No occurrence may fall after this date.
    pub until: Option<NaiveDate>,
}

/// Recurrence pattern for one task.
///
/// Modeled as a tagged union so future rule kinds can be added without
/// breaking consumers; `interval` is the only supported variant today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recurrence {
    Interval(IntervalRule),
}

impl Recurrence {
    /// Builds an unbounded interval recurrence.
    pub fn interval(every: f64, unit: FrequencyUnit) -> Self {
        Self::Interval(IntervalRule {
            every,
            unit,
            anchor_date: None,
            count: None,
            until: None,
        })
    }

    /// Returns the interval rule parameters.
    pub fn rule(&self) -> &IntervalRule {
        match self {
            Self::Interval(rule) => rule,
        }
    }

    /// Returns the interval rule parameters mutably.
    pub fn rule_mut(&mut self) -> &mut IntervalRule {
        match self {
            Self::Interval(rule) => rule,
        }
    }
}

/// Category used for grouping and filtering tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskCategory {
    Hair,
    Nails,
    Lashes,
    Skin,
    Brows,
    Waxing,
    Other,
}

/// Canonical domain record for a scheduled activity.
///
/// The recurrence and completion fields are the inputs of the schedule
/// layer; the remaining fields are descriptive store data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Stable global ID used for linking and auditing.
    pub uuid: TaskId,
    /// Display name.
    pub name: String,
    /// Grouping category.
    pub category: TaskCategory,
    /// Optional display color hint.
    pub color: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Expected duration in minutes.
    pub duration_mins: Option<u32>,
    /// Whether the task may be moved around other commitments.
    pub is_flexible: bool,
    /// Absent means the task is one-off and never projected.
    pub recurrence: Option<Recurrence>,
    /// Inactive tasks never produce occurrences.
    pub active: bool,
    /// Moment of the most recent completion. Absent until first completion.
    pub last_done_at: Option<DateTime<Utc>>,
    /// Cached next due date, recomputed on every completion.
    pub next_due_at: Option<NaiveDate>,
    /// Soft delete tombstone to preserve history.
    pub is_deleted: bool,
}

/// Validation failures for caller-supplied task data.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskValidationError {
    NilUuid,
    EmptyName,
    NonPositiveEvery(f64),
    ZeroCount,
    SubDayStep { every: f64, unit: FrequencyUnit },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "task uuid must not be nil"),
            Self::EmptyName => write!(f, "task name must not be empty"),
            Self::NonPositiveEvery(every) => {
                write!(f, "recurrence every ({every}) must be positive")
            }
            Self::ZeroCount => write!(f, "recurrence count must be at least 1"),
            Self::SubDayStep { every, unit } => write!(
                f,
                "recurrence step every={every} unit={unit:?} resolves below one day"
            ),
        }
    }
}

impl Error for TaskValidationError {}

impl Task {
    /// Creates a one-off task with a generated stable ID.
    ///
    /// Optional fields start as `None`, `active` starts as `true`, and the
    /// task has no completion history.
    pub fn new(name: impl Into<String>, category: TaskCategory) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            category,
            color: None,
            notes: None,
            duration_mins: None,
            is_flexible: false,
            recurrence: None,
            active: true,
            last_done_at: None,
            next_due_at: None,
            is_deleted: false,
        }
    }

    /// Creates a task with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    ///
    /// # Errors
    /// Returns a validation error when `uuid` is nil or `name` is empty.
    pub fn with_id(
        uuid: TaskId,
        name: impl Into<String>,
        category: TaskCategory,
    ) -> Result<Self, TaskValidationError> {
        let mut task = Self::new(name, category);
        task.uuid = uuid;
        task.validate()?;
        Ok(task)
    }

    /// Checks structural rules before persistence.
    ///
    /// Malformed recurrence input is a caller contract violation and is
    /// rejected here, at task-creation time, rather than defended against
    /// inside the pure schedule functions.
    ///
    /// # Errors
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.uuid.is_nil() {
            return Err(TaskValidationError::NilUuid);
        }
        if self.name.trim().is_empty() {
            return Err(TaskValidationError::EmptyName);
        }
        if let Some(recurrence) = &self.recurrence {
            let rule = recurrence.rule();
            if rule.every <= 0.0 {
                return Err(TaskValidationError::NonPositiveEvery(rule.every));
            }
            if rule.count == Some(0) {
                return Err(TaskValidationError::ZeroCount);
            }
            if crate::schedule::step_days(rule.every, rule.unit) < 1 {
                return Err(TaskValidationError::SubDayStep {
                    every: rule.every,
                    unit: rule.unit,
                });
            }
        }
        Ok(())
    }

    /// Marks this task as softly deleted (tombstoned).
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Clears the soft delete flag.
    pub fn restore(&mut self) {
        self.is_deleted = false;
    }
}
