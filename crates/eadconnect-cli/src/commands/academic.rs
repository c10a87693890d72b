// SPDX-License-Identifier: Apache-2.0

//! Read-only academic queries.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use eadconnect_core::{
    AcademicService, AppConfig, CoursesQuery, SnapshotCache, calendar_range, detect_grade_changes,
};
use tracing::{debug, info, instrument, warn};

use super::types::{
    AppointmentTypesResult, CalendarResult, CoursesResult, GradesResult, MessagesResult,
    NoticesResult, list_items,
};
use crate::session;

/// The configured period, or the platform's most recent one when asked.
async fn resolve_period(
    service: &AcademicService<'_>,
    config: &AppConfig,
    latest: bool,
) -> Result<u64> {
    if !latest {
        return Ok(config.academic.period);
    }
    match service.active_period_id().await? {
        Some(period) => {
            debug!(period, "Using most recent period");
            Ok(period)
        }
        None => {
            warn!(
                period = config.academic.period,
                "No periods reported, using the configured one"
            );
            Ok(config.academic.period)
        }
    }
}

/// Courses of the configured period.
#[instrument(skip(config))]
pub async fn courses(config: &AppConfig, all: bool, latest_period: bool) -> Result<CoursesResult> {
    let client = session::academic_client(config).await?;
    let period = resolve_period(&AcademicService::new(&client), config, latest_period).await?;

    let courses = if all {
        client
            .get_my_courses(&CoursesQuery::for_period(period))
            .await?
            .courses
    } else {
        AcademicService::new(&client)
            .active_disciplines(period)
            .await?
    };

    Ok(CoursesResult {
        period,
        all,
        courses,
    })
}

/// Final grades of the running term, compared with the monitor's last snapshot.
#[instrument(skip(config))]
pub async fn grades(config: &AppConfig, latest_period: bool) -> Result<GradesResult> {
    let client = session::academic_client(config).await?;
    let service = AcademicService::new(&client);
    let period = resolve_period(&service, config, latest_period).await?;

    let courses = service.active_disciplines(period).await?;
    info!("📚 {} active courses", courses.len());
    let grades = service
        .grades_by_course(
            &courses,
            Duration::from_secs(config.http.request_delay_seconds),
        )
        .await?;

    let previous = SnapshotCache::new(config.monitor.cache_path()).load();
    let changes = if previous.is_empty() {
        BTreeMap::new()
    } else {
        detect_grade_changes(&grades, &previous)
    };

    Ok(GradesResult { grades, changes })
}

/// Latest message per inbox conversation.
#[instrument(skip(config))]
pub async fn messages(config: &AppConfig, page: u32, per_page: u32) -> Result<MessagesResult> {
    let client = session::academic_client(config).await?;
    let messages = AcademicService::new(&client)
        .latest_messages(page, per_page)
        .await?;
    Ok(MessagesResult { messages })
}

/// Global notices, or highlighted notices of one course.
#[instrument(skip(config))]
pub async fn notices(config: &AppConfig, course: Option<u64>) -> Result<NoticesResult> {
    let client = session::academic_client(config).await?;
    let response = match course {
        Some(id) => client.get_course_notices(id, 1, 5).await?,
        None => client.get_notices(1, 15).await?,
    };
    Ok(NoticesResult {
        course,
        notices: list_items(response),
    })
}

/// Appointments between `start` (default today) and `end`.
#[instrument(skip(config))]
pub async fn calendar(
    config: &AppConfig,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<CalendarResult> {
    let start = start.unwrap_or_else(|| Local::now().date_naive());
    let (start, end) = calendar_range(start, end);

    let client = session::academic_client(config).await?;
    let response = AcademicService::new(&client).calendar(&start, &end).await?;

    Ok(CalendarResult {
        start,
        end,
        appointments: list_items(response),
    })
}

/// Appointment types known to the calendar.
#[instrument(skip(config))]
pub async fn appointment_types(config: &AppConfig) -> Result<AppointmentTypesResult> {
    let client = session::academic_client(config).await?;
    let response = client.get_appointment_types().await?;
    Ok(AppointmentTypesResult {
        types: list_items(response),
    })
}
