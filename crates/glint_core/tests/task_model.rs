use chrono::NaiveDate;
use glint_core::{
    FrequencyAdvice, FrequencyUnit, IntervalRule, Recurrence, RescheduleAdvice, Task,
    TaskCategory, TaskValidationError,
};
use uuid::Uuid;

#[test]
fn task_new_sets_defaults() {
    let task = Task::new("wash hair", TaskCategory::Hair);

    assert!(!task.uuid.is_nil());
    assert_eq!(task.name, "wash hair");
    assert_eq!(task.category, TaskCategory::Hair);
    assert_eq!(task.recurrence, None);
    assert_eq!(task.last_done_at, None);
    assert_eq!(task.next_due_at, None);
    assert!(task.active);
    assert!(!task.is_flexible);
    assert!(!task.is_deleted);
}

#[test]
fn soft_delete_and_restore_work() {
    let mut task = Task::new("brow tint", TaskCategory::Brows);

    task.soft_delete();
    assert!(task.is_deleted);

    task.restore();
    assert!(!task.is_deleted);
}

#[test]
fn task_serialization_uses_expected_wire_fields() {
    let task_id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut task = Task::with_id(task_id, "lash fill", TaskCategory::Lashes).unwrap();
    task.recurrence = Some(Recurrence::Interval(IntervalRule {
        every: 2.5,
        unit: FrequencyUnit::Weeks,
        anchor_date: Some(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()),
        count: Some(4),
        until: None,
    }));
    task.next_due_at = Some(NaiveDate::from_ymd_opt(2026, 3, 20).unwrap());

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["uuid"], task_id.to_string());
    assert_eq!(json["category"], "Lashes");
    assert_eq!(json["recurrence"]["kind"], "interval");
    assert_eq!(json["recurrence"]["every"], 2.5);
    assert_eq!(json["recurrence"]["unit"], "weeks");
    assert_eq!(json["recurrence"]["anchor_date"], "2026-03-02");
    assert_eq!(json["recurrence"]["count"], 4);
    assert_eq!(json["next_due_at"], "2026-03-20");
    assert_eq!(json["is_deleted"], false);

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn with_id_rejects_nil_uuid() {
    let err = Task::with_id(Uuid::nil(), "invalid", TaskCategory::Other).unwrap_err();
    assert_eq!(err, TaskValidationError::NilUuid);
}

#[test]
fn validate_rejects_blank_name() {
    let mut task = Task::new("temp", TaskCategory::Other);
    task.name = "   ".to_string();
    assert_eq!(task.validate().unwrap_err(), TaskValidationError::EmptyName);
}

#[test]
fn validate_rejects_non_positive_every() {
    let mut task = Task::new("exfoliate", TaskCategory::Skin);
    task.recurrence = Some(Recurrence::interval(0.0, FrequencyUnit::Days));
    assert_eq!(
        task.validate().unwrap_err(),
        TaskValidationError::NonPositiveEvery(0.0)
    );
}

#[test]
fn validate_rejects_zero_count() {
    let mut task = Task::new("wax", TaskCategory::Waxing);
    let mut recurrence = Recurrence::interval(4.0, FrequencyUnit::Weeks);
    recurrence.rule_mut().count = Some(0);
    task.recurrence = Some(recurrence);
    assert_eq!(task.validate().unwrap_err(), TaskValidationError::ZeroCount);
}

#[test]
fn validate_rejects_rules_that_resolve_below_one_day() {
    let mut task = Task::new("mist face", TaskCategory::Skin);
    task.recurrence = Some(Recurrence::interval(0.2, FrequencyUnit::Days));
    assert!(matches!(
        task.validate().unwrap_err(),
        TaskValidationError::SubDayStep { .. }
    ));

    // 0.1 weeks rounds to a one-day step, which is the supported minimum.
    task.recurrence = Some(Recurrence::interval(0.1, FrequencyUnit::Weeks));
    assert!(task.validate().is_ok());
}

#[test]
fn frequency_advice_matches_service_wire_shape() {
    let advice: FrequencyAdvice = serde_json::from_str(
        r#"{"every": 2.5, "unit": "weeks", "confidence": 0.8, "reason": "typical retention"}"#,
    )
    .unwrap();

    assert_eq!(advice.every, 2.5);
    assert_eq!(advice.unit, FrequencyUnit::Weeks);
    assert_eq!(advice.confidence, Some(0.8));
    assert_eq!(advice.reason.as_deref(), Some("typical retention"));
}

#[test]
fn reschedule_advice_reads_camel_case_new_date() {
    let advice: RescheduleAdvice =
        serde_json::from_str(r#"{"newDate": "2026-03-20"}"#).unwrap();

    assert_eq!(
        advice.new_date,
        NaiveDate::from_ymd_opt(2026, 3, 20).unwrap()
    );
    assert_eq!(advice.confidence, None);
    assert_eq!(advice.reason, None);
}
