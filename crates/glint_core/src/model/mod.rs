//! Domain model for recurring personal-care tasks.
//!
//! # Responsibility
//! - Define the canonical task and recurrence structures used by core logic.
//! - Keep validation rules for caller-supplied data at the model boundary.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is represented by soft-delete tombstones, not hard delete.
//! - Recurrence rules that reach persistence have passed `Task::validate()`.

pub mod advice;
pub mod task;
