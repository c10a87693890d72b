// SPDX-License-Identifier: Apache-2.0

//! Result types returned by command handlers.
//!
//! Command handlers return data instead of printing directly; the `output`
//! module renders them as text or JSON.

use std::collections::BTreeMap;

use eadconnect_core::{Course, CourseSummary, GradeChange, GradeSnapshot};
use serde::Serialize;
use serde_json::Value;

/// Result from the auth login/status commands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthStatusResult {
    /// Whether a valid academic session exists.
    pub authenticated: bool,
    /// Institution slug.
    pub institution: String,
    /// Platform username, when configured.
    pub username: Option<String>,
    /// Display name from the profile.
    pub name: Option<String>,
    /// E-mail from the profile.
    pub email: Option<String>,
    /// Whether an academic token is stored on disk.
    pub access_token_stored: bool,
    /// Whether an app token is stored on disk.
    pub app_token_stored: bool,
}

/// Result from the courses command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CoursesResult {
    /// Period queried.
    pub period: u64,
    /// Whether non-active courses were included.
    pub all: bool,
    /// Courses.
    pub courses: Vec<Course>,
}

/// Result from the grades command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GradesResult {
    /// Final grade per discipline.
    pub grades: GradeSnapshot,
    /// Disciplines that differ from the monitor's last snapshot.
    pub changes: BTreeMap<String, GradeChange>,
}

/// Result from the messages command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MessagesResult {
    /// Latest message of each conversation.
    pub messages: Vec<Value>,
}

/// Result from the notices command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NoticesResult {
    /// Course filter, if any.
    pub course: Option<u64>,
    /// Notices.
    pub notices: Vec<Value>,
}

/// Result from the calendar command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CalendarResult {
    /// First day (inclusive).
    pub start: String,
    /// Last day (inclusive).
    pub end: String,
    /// Appointments.
    pub appointments: Vec<Value>,
}

/// Result from `calendar --types`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AppointmentTypesResult {
    /// Appointment types.
    pub types: Vec<Value>,
}

/// A course whose extraction failed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FailedCourse {
    /// Course title.
    pub title: String,
    /// Error message.
    pub error: String,
}

/// Result from the exercises command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExercisesResult {
    /// Output root.
    pub output_dir: String,
    /// Per-course summaries.
    pub courses: Vec<CourseSummary>,
    /// Courses that failed.
    pub failed: Vec<FailedCourse>,
}

/// Result from a finance command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FinanceResult {
    /// Section title.
    pub title: String,
    /// Raw service-portal response.
    pub data: Value,
}

/// Items of a list response, which the platform returns either bare or
/// wrapped under a `data`/`items` key.
pub fn list_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => ["data", "items", "results"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_items_accepts_bare_and_wrapped_lists() {
        assert_eq!(list_items(json!([1, 2])).len(), 2);
        assert_eq!(list_items(json!({"data": [1]})).len(), 1);
        assert_eq!(list_items(json!({"items": [1, 2, 3]})).len(), 3);
        assert!(list_items(json!({"other": 1})).is_empty());
        assert!(list_items(json!(null)).is_empty());
    }
}
