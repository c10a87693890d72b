// SPDX-License-Identifier: Apache-2.0

//! Academic helpers built on top of the raw client calls.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::EducationClient;
use crate::error::ApiError;
use crate::models::{ACTIVE_STATUS, Course, CoursesQuery};

/// A grade that differs between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeChange {
    /// Value in the older snapshot, `None` when the course is new.
    pub before: Option<Value>,
    /// Value in the newer snapshot.
    pub now: Value,
}

/// Academic queries for one authenticated client.
#[derive(Debug, Clone, Copy)]
pub struct AcademicService<'a> {
    client: &'a EducationClient,
}

impl<'a> AcademicService<'a> {
    /// Wraps an authenticated client.
    #[must_use]
    pub fn new(client: &'a EducationClient) -> Self {
        Self { client }
    }

    /// Id of the most recent period, if the student has any.
    #[instrument(skip(self))]
    pub async fn active_period_id(&self) -> Result<Option<u64>, ApiError> {
        let periods = self.client.get_periods().await?;
        Ok(periods.last().map(|p| p.id))
    }

    /// Courses of `period` whose status is one of `statuses`.
    #[instrument(skip(self))]
    pub async fn disciplines(&self, period: u64, statuses: &[&str]) -> Result<Vec<Course>, ApiError> {
        let page = self
            .client
            .get_my_courses(&CoursesQuery::for_period(period))
            .await?;
        let courses: Vec<Course> = page
            .courses
            .into_iter()
            .filter(|c| statuses.contains(&c.status.as_str()))
            .collect();
        debug!(count = courses.len(), "Filtered disciplines");
        Ok(courses)
    }

    /// Courses of the running term.
    pub async fn active_disciplines(&self, period: u64) -> Result<Vec<Course>, ApiError> {
        self.disciplines(period, &[ACTIVE_STATUS]).await
    }

    /// Final grade per discipline name, fetched one course at a time.
    ///
    /// Waits `delay` between consecutive grade requests.
    #[instrument(skip(self, courses), fields(courses = courses.len()))]
    pub async fn grades_by_course(
        &self,
        courses: &[Course],
        delay: Duration,
    ) -> Result<BTreeMap<String, Value>, ApiError> {
        let mut grades = BTreeMap::new();
        for (index, course) in courses.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let report = self.client.get_grades(course.id).await?;
            let value = report.final_value();
            debug!(course = course.id, grade = %value, "Fetched grade");
            grades.insert(course.discipline_name().to_string(), value);
        }
        Ok(grades)
    }

    /// First message of every conversation in the inbox.
    #[instrument(skip(self))]
    pub async fn latest_messages(&self, page: u32, per_page: u32) -> Result<Vec<Value>, ApiError> {
        let response = self.client.get_messages(page, per_page).await?;
        Ok(first_message_per_conversation(&response))
    }

    /// Calendar appointments in a date range.
    pub async fn calendar(&self, start_date: &str, end_date: &str) -> Result<Value, ApiError> {
        self.client.get_calendar(start_date, end_date).await
    }
}

/// Days covered by the calendar when no end date is given.
pub const DEFAULT_CALENDAR_DAYS: u64 = 30;

/// `(start, end)` dates formatted `YYYY-MM-DD`, `end` defaulting to
/// [`DEFAULT_CALENDAR_DAYS`] after `start`.
#[must_use]
pub fn calendar_range(start: NaiveDate, end: Option<NaiveDate>) -> (String, String) {
    let end = end
        .or_else(|| start.checked_add_days(Days::new(DEFAULT_CALENDAR_DAYS)))
        .unwrap_or(start);
    (
        start.format("%Y-%m-%d").to_string(),
        end.format("%Y-%m-%d").to_string(),
    )
}

/// Grades that changed between `previous` and `current`.
#[must_use]
pub fn detect_grade_changes(
    current: &BTreeMap<String, Value>,
    previous: &BTreeMap<String, Value>,
) -> BTreeMap<String, GradeChange> {
    current
        .iter()
        .filter(|(name, value)| previous.get(*name) != Some(*value))
        .map(|(name, value)| {
            (
                name.clone(),
                GradeChange {
                    before: previous.get(name).cloned(),
                    now: value.clone(),
                },
            )
        })
        .collect()
}

/// Extracts the first message of each conversation from a messages page.
///
/// Accepts both a bare array and an object wrapping it under `data` or
/// `conversations`; each conversation carries its thread under `messages`.
fn first_message_per_conversation(response: &Value) -> Vec<Value> {
    let conversations = response
        .as_array()
        .or_else(|| response.get("data").and_then(Value::as_array))
        .or_else(|| response.get("conversations").and_then(Value::as_array));

    conversations
        .into_iter()
        .flatten()
        .filter_map(|conversation| {
            conversation
                .get("messages")
                .and_then(Value::as_array)
                .and_then(|messages| messages.first())
                .cloned()
        })
        .collect()
}
