//! Recurrence projection and completion transitions.
//!
//! # Responsibility
//! - Resolve `(every, unit)` pairs into whole-day steps.
//! - Project occurrence sequences into arbitrary date windows.
//! - Produce updated task values for completion events.
//!
//! # Invariants
//! - Every function is pure: no clock reads, no I/O, no shared state.
//! - All date comparisons happen at whole-day granularity.
//! - `count` and `until` bounds are applied identically by every entry point.

mod recurrence;

pub use recurrence::{complete_now, next_occurrence, occurrences_in_range, step_days};
