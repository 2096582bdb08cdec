//! Advice payloads from the external suggestion service.
//!
//! # Responsibility
//! - Mirror the wire shapes returned by the `/ai/frequency` and
//!   `/ai/reschedule` endpoints.
//!
//! # Invariants
//! - Advice is ordinary user-editable input; core never validates or trusts
//!   it beyond the same rules applied to manual edits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::task::FrequencyUnit;

/// Suggested recurrence interval for a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyAdvice {
    pub every: f64,
    pub unit: FrequencyUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Suggested replacement date for a missed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleAdvice {
    pub new_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
