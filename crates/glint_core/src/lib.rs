//! Core domain logic for Glint, a personal-care routine planner.
//! This crate is the single source of truth for recurrence invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::advice::{FrequencyAdvice, RescheduleAdvice};
pub use model::task::{
    FrequencyUnit, IntervalRule, Recurrence, Task, TaskCategory, TaskId, TaskValidationError,
};
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskListQuery, TaskRepository,
};
pub use schedule::{complete_now, next_occurrence, occurrences_in_range, step_days};
pub use service::task_service::{DueDay, TaskService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
