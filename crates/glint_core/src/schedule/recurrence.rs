//! Fixed-interval recurrence engine.
//!
//! # Responsibility
//! - Walk a task's occurrence sequence forward from its anchor in whole-day
//!   steps, honoring `count`/`until` bounds.
//! - Advance completion state without mutating the input task.
//!
//! # Invariants
//! - The anchor is `last_done_at` once a completion exists, otherwise the
//!   configured `anchor_date`, otherwise the caller's reference date.
//! - After a completion the first occurrence is one full step later; a task
//!   is never due again on the day it was completed.
//! - The `count` ordinal is measured from the current anchor, not from the
//!   window start.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::model::task::{FrequencyUnit, IntervalRule, Task};

/// Resolves a recurrence step to a whole number of days.
///
/// Weeks and months use fixed-length approximations (7 and 30 days);
/// fractional `every` values are rounded once, at this boundary, before any
/// date arithmetic. This is an explicit approximation policy kept for
/// reproducibility of stored schedules.
pub fn step_days(every: f64, unit: FrequencyUnit) -> i64 {
    let factor = match unit {
        FrequencyUnit::Days => 1.0,
        FrequencyUnit::Weeks => 7.0,
        FrequencyUnit::Months => 30.0,
    };
    (every * factor).round() as i64
}

/// Projects all occurrences of `task` inside `[start, end]`, ascending.
///
/// Returns an empty sequence when the task has no recurrence, is inactive,
/// or its bounds are already exhausted before the window. The result is a
/// pure function of `(task, start, end)`.
pub fn occurrences_in_range(task: &Task, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let Some(walk) = Walk::start(task, start) else {
        return Vec::new();
    };

    let mut occurrences = Vec::new();
    let mut candidate = walk.first_on_or_after(start);
    while candidate <= end {
        if walk.exceeds_bounds(candidate) {
            break;
        }
        occurrences.push(candidate);
        candidate += Duration::days(walk.step);
    }
    occurrences
}

/// Returns the first occurrence of `task` on or after `from`.
///
/// `None` when the task has no recurrence, is inactive, or the next
/// candidate already violates a `count`/`until` bound.
pub fn next_occurrence(task: &Task, from: NaiveDate) -> Option<NaiveDate> {
    let walk = Walk::start(task, from)?;
    let candidate = walk.first_on_or_after(from);
    if walk.exceeds_bounds(candidate) {
        return None;
    }
    Some(candidate)
}

/// Records a completion at `now` and returns the updated task value.
///
/// Sets `last_done_at = now` and recomputes the cached `next_due_at` from
/// the shifted anchor; a recurrence whose bounds are exhausted leaves
/// `next_due_at` absent, which is a normal terminal state rather than an
/// error. The input task is not mutated. Deliberately not idempotent:
/// every call represents a real completion event and advances the anchor.
pub fn complete_now(task: &Task, now: DateTime<Utc>) -> Task {
    let mut updated = task.clone();
    updated.last_done_at = Some(now);
    updated.next_due_at = next_occurrence(&updated, now.date_naive());
    updated
}

/// Resolved walk parameters for one projection.
struct Walk<'rule> {
    rule: &'rule IntervalRule,
    anchor: NaiveDate,
    /// First candidate date; one step past the anchor when a completion
    /// exists, the anchor itself otherwise.
    origin: NaiveDate,
    step: i64,
}

impl<'rule> Walk<'rule> {
    /// Resolves anchor and step, or `None` when the task cannot produce
    /// occurrences at all.
    fn start(task: &'rule Task, reference: NaiveDate) -> Option<Self> {
        if !task.active {
            return None;
        }
        let rule = task.recurrence.as_ref()?.rule();
        let step = step_days(rule.every, rule.unit);
        if step < 1 {
            // Sub-day steps are rejected by validation; guard here so a
            // malformed stored rule cannot wedge the walk.
            return None;
        }

        let (anchor, origin) = match task.last_done_at {
            Some(done_at) => {
                let anchor = done_at.date_naive();
                (anchor, anchor + Duration::days(step))
            }
            None => {
                let anchor = rule.anchor_date.unwrap_or(reference);
                (anchor, anchor)
            }
        };

        Some(Self {
            rule,
            anchor,
            origin,
            step,
        })
    }

    /// Skips candidates strictly before `start`; they are never yielded.
    fn first_on_or_after(&self, start: NaiveDate) -> NaiveDate {
        let mut candidate = self.origin;
        if candidate < start {
            let behind = (start - candidate).num_days();
            let steps = behind.div_euclid(self.step);
            candidate += Duration::days(steps * self.step);
            if candidate < start {
                candidate += Duration::days(self.step);
            }
        }
        candidate
    }

    /// Applies the shared `count`/`until` bound policy to one candidate.
    ///
    /// Either bound can independently stop the stream; whichever triggers
    /// first wins. The `count` ordinal is 1-based and measured from the
    /// current anchor.
    fn exceeds_bounds(&self, candidate: NaiveDate) -> bool {
        if let Some(count) = self.rule.count {
            let ordinal = (candidate - self.anchor).num_days() / self.step + 1;
            if ordinal > i64::from(count) {
                return true;
            }
        }
        if let Some(until) = self.rule.until {
            if candidate > until {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Recurrence, TaskCategory};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn step_days_rounds_at_the_unit_boundary() {
        assert_eq!(step_days(3.0, FrequencyUnit::Days), 3);
        assert_eq!(step_days(2.0, FrequencyUnit::Weeks), 14);
        assert_eq!(step_days(2.5, FrequencyUnit::Weeks), 18);
        assert_eq!(step_days(1.0, FrequencyUnit::Months), 30);
        assert_eq!(step_days(0.5, FrequencyUnit::Months), 15);
    }

    #[test]
    fn sub_day_step_produces_no_occurrences() {
        let mut task = Task::new("hair mask", TaskCategory::Hair);
        task.recurrence = Some(Recurrence::interval(0.05, FrequencyUnit::Days));

        let window_end = date(2026, 3, 31);
        assert!(occurrences_in_range(&task, date(2026, 3, 1), window_end).is_empty());
        assert_eq!(next_occurrence(&task, date(2026, 3, 1)), None);
    }

    #[test]
    fn anchor_falls_back_to_window_start_without_history_or_anchor_date() {
        let mut task = Task::new("wash hair", TaskCategory::Hair);
        task.recurrence = Some(Recurrence::interval(3.0, FrequencyUnit::Days));

        let start = date(2026, 3, 2);
        let found = occurrences_in_range(&task, start, date(2026, 3, 10));
        assert_eq!(found, vec![start, date(2026, 3, 5), date(2026, 3, 8)]);
    }

    #[test]
    fn count_ordinal_is_measured_from_the_shifted_anchor() {
        let mut task = Task::new("lash fill", TaskCategory::Lashes);
        task.recurrence = Some(Recurrence::Interval(IntervalRule {
            every: 1.0,
            unit: FrequencyUnit::Weeks,
            anchor_date: Some(date(2026, 3, 2)),
            count: Some(3),
            until: None,
        }));
        task.last_done_at = Some(date(2026, 3, 9).and_hms_opt(9, 0, 0).unwrap().and_utc());

        // Anchor is now Mar 9; the first candidate sits at ordinal 2, so a
        // count of 3 leaves exactly two future occurrences.
        let found = occurrences_in_range(&task, date(2026, 3, 1), date(2026, 5, 1));
        assert_eq!(found, vec![date(2026, 3, 16), date(2026, 3, 23)]);
    }
}
