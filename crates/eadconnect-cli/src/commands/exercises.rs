// SPDX-License-Identifier: Apache-2.0

//! Exercise extraction for the configured course list.

use std::time::Duration;

use anyhow::Result;
use eadconnect_core::{AppConfig, ExerciseExtractor};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, instrument};

use super::types::{ExercisesResult, FailedCourse};
use crate::cli::OutputContext;
use crate::session;

fn progress_bar(ctx: &OutputContext, len: usize) -> Option<ProgressBar> {
    if !ctx.is_interactive() {
        return None;
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{bar:30.cyan/blue} {pos}/{len} {msg}") {
        bar.set_style(style);
    }
    Some(bar)
}

/// Extracts every configured course; a failing course does not stop the rest.
#[instrument(skip_all, fields(courses = config.exercises.courses.len()))]
pub async fn run(config: &AppConfig, ctx: &OutputContext) -> Result<ExercisesResult> {
    let client = session::academic_client(config).await?;
    let output_root = config.exercises.output_root();
    let extractor = ExerciseExtractor::new(
        &client,
        &output_root,
        Duration::from_secs(config.http.request_delay_seconds),
    );

    let bar = progress_bar(ctx, config.exercises.courses.len());
    let mut result = ExercisesResult {
        output_dir: output_root.display().to_string(),
        courses: Vec::new(),
        failed: Vec::new(),
    };

    for course in &config.exercises.courses {
        if let Some(bar) = &bar {
            bar.set_message(course.title.clone());
        }
        match extractor.extract_course(course).await {
            Ok(summary) => result.courses.push(summary),
            Err(e) => {
                error!(course = course.id, error = %e, "❌ Extraction failed");
                result.failed.push(FailedCourse {
                    title: course.title.clone(),
                    error: e.to_string(),
                });
            }
        }
        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    Ok(result)
}
