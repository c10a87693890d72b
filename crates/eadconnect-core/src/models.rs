// SPDX-License-Identifier: Apache-2.0

//! Typed views of the platform responses this crate reads.
//!
//! Only the fields we consume are modelled; everything else stays in
//! `serde_json::Value` and is passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Course status the platform uses for the running term.
pub const ACTIVE_STATUS: &str = "isActual";

/// Placeholder shown when a course has no final grade yet.
pub const NOT_AVAILABLE: &str = "N/A";

/// Default academic period sent with the courses query.
pub const DEFAULT_PERIOD: u64 = 11903;

/// Body of the signin and role-assumption calls.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Issued token, if any.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl TokenResponse {
    /// The token when present and non-empty.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Profile returned by `/users/me`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    /// Logged-in user.
    #[serde(default)]
    pub user: UserInfo,
}

/// User identity fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// E-mail address.
    #[serde(default)]
    pub email: Option<String>,
}

/// An academic period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    /// Period identifier used by the courses query.
    pub id: u64,
    /// Human readable name.
    #[serde(default)]
    pub name: Option<String>,
}

/// One page of `/courses/me`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoursesPage {
    /// Courses on this page.
    #[serde(default)]
    pub courses: Vec<Course>,
}

/// A course (discipline) the student is enrolled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Course identifier.
    pub id: u64,
    /// Course name, often suffixed with a class code in parentheses.
    #[serde(default)]
    pub name: String,
    /// Enrollment status (`isActual`, `isPast`, ...).
    #[serde(default)]
    pub status: String,
}

impl Course {
    /// Whether the course belongs to the running term.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ACTIVE_STATUS
    }

    /// Course name without the trailing ` (class code)` suffix.
    #[must_use]
    pub fn discipline_name(&self) -> &str {
        self.name.split(" (").next().unwrap_or(&self.name)
    }
}

/// Body of `/grades/me/course/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    /// Final grade block.
    #[serde(default)]
    pub final_grade: Option<FinalGrade>,
}

/// Final grade of a course.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinalGrade {
    /// Grade value: number, string, or null while unpublished.
    #[serde(default)]
    pub value: Value,
}

impl GradeReport {
    /// Final grade value, `"N/A"` when none is published.
    #[must_use]
    pub fn final_value(&self) -> Value {
        match &self.final_grade {
            Some(FinalGrade { value }) if !value.is_null() => value.clone(),
            _ => Value::from(NOT_AVAILABLE),
        }
    }
}

/// Query parameters for `/courses/me`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoursesQuery {
    /// Enrollment state filter.
    pub state: String,
    /// Academic period id.
    pub period: u64,
    /// Page number, starting at 1.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
}

impl Default for CoursesQuery {
    fn default() -> Self {
        Self {
            state: "all".to_string(),
            period: DEFAULT_PERIOD,
            page: 1,
            limit: 20,
        }
    }
}

impl CoursesQuery {
    /// Default query for a specific period.
    #[must_use]
    pub fn for_period(period: u64) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }
}

/// Query parameters for the financial debts listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtsQuery {
    /// Student registration number (academic record).
    pub registration_number: Option<String>,
    /// Status filter.
    pub status: String,
    /// Page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
}

impl Default for DebtsQuery {
    fn default() -> Self {
        Self {
            registration_number: None,
            status: "pending".to_string(),
            page: 1,
            per_page: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_discipline_name_strips_class_code() {
        let course = Course {
            id: 1,
            name: "Gestão de Projetos (T01)".to_string(),
            status: ACTIVE_STATUS.to_string(),
        };
        assert_eq!(course.discipline_name(), "Gestão de Projetos");
        assert!(course.is_active());
    }

    #[test]
    fn test_final_value_defaults_to_not_available() {
        let report: GradeReport = serde_json::from_value(json!({})).unwrap();
        assert_eq!(report.final_value(), json!("N/A"));

        let report: GradeReport =
            serde_json::from_value(json!({"finalGrade": {"value": null}})).unwrap();
        assert_eq!(report.final_value(), json!("N/A"));
    }

    #[test]
    fn test_final_value_keeps_numeric_grade() {
        let report: GradeReport =
            serde_json::from_value(json!({"finalGrade": {"value": 8.5}})).unwrap();
        assert_eq!(report.final_value(), json!(8.5));
    }

    #[test]
    fn test_token_response_ignores_empty_token() {
        let resp: TokenResponse = serde_json::from_value(json!({"accessToken": ""})).unwrap();
        assert!(resp.token().is_none());
        let resp: TokenResponse = serde_json::from_value(json!({"other": 1})).unwrap();
        assert!(resp.token().is_none());
    }
}
