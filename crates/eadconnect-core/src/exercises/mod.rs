// SPDX-License-Identifier: Apache-2.0

//! Exercise extraction.
//!
//! Walks the content tree of a course, pulls the exercise block of every
//! topic, dumps it as JSON and as a PDF, and zips both directories per
//! course.
//!
//! Output layout under the output root:
//!
//! ```text
//! json/<slug>/<topic_id>.json   json/<slug>.zip
//! pdfs/<slug>/<title>.pdf       pdfs/<slug>.zip
//! ```

mod archive;
mod pdf;
mod text;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

pub use archive::zip_directory;
pub use pdf::{FontSource, render_pdf};
pub use text::{file_stem, html_to_text, wrap};

use crate::client::EducationClient;
use crate::config::ExerciseCourse;
use crate::error::{DocumentError, EadError};

/// Index of the exercise list inside a course's `topics`.
const EXERCISE_LIST_INDEX: usize = 2;

/// Index of the exercise block inside a topic's `topics`.
const EXERCISE_CONTENT_INDEX: usize = 4;

/// Exercises of one topic, as dumped to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    /// Course title.
    pub discipline: String,
    /// Topic title.
    pub title: String,
    /// Raw exercise content (`{"questions": [...]}`).
    pub content: Value,
}

impl ExerciseSet {
    /// Typed questions of this set.
    pub fn questions(&self) -> Result<Vec<Question>, DocumentError> {
        #[derive(Deserialize)]
        struct Content {
            questions: Vec<Question>,
        }
        let content: Content = serde_json::from_value(self.content.clone())?;
        Ok(content.questions)
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    /// Statement (HTML).
    #[serde(default)]
    pub enunciated: String,
    /// Options in display order.
    #[serde(default)]
    pub options: Vec<AnswerOption>,
}

/// A question option.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    /// Option text (HTML).
    #[serde(default)]
    pub text: String,
    /// Whether this is the right answer.
    #[serde(default)]
    pub is_correct: bool,
    /// Explanation (HTML), possibly empty.
    #[serde(default)]
    pub feedback: String,
}

impl Question {
    /// First correct option with its letter (`A`, `B`, ...).
    #[must_use]
    pub fn correct_option(&self) -> Option<(char, &AnswerOption)> {
        self.options
            .iter()
            .zip('A'..='Z')
            .find(|(option, _)| option.is_correct)
            .map(|(option, letter)| (letter, option))
    }
}

/// A topic listed in a course's exercise section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicRef {
    /// Topic id.
    pub id: u64,
    /// Topic title.
    #[serde(default)]
    pub title: String,
}

fn section<'a>(value: &'a Value, index: usize, context: &str) -> Result<&'a Value, DocumentError> {
    value
        .get("topics")
        .and_then(Value::as_array)
        .and_then(|topics| topics.get(index))
        .ok_or_else(|| DocumentError::MissingSection(format!("{context}: topics[{index}]")))
}

/// Topics of the exercise section of a course contents response.
pub fn list_topics(contents: &Value) -> Result<Vec<TopicRef>, DocumentError> {
    let children = section(contents, EXERCISE_LIST_INDEX, "course contents")?
        .get("children")
        .cloned()
        .ok_or_else(|| {
            DocumentError::MissingSection(format!(
                "course contents: topics[{EXERCISE_LIST_INDEX}].children"
            ))
        })?;
    Ok(serde_json::from_value(children)?)
}

/// Exercise block of a topic response.
pub fn exercise_content(topic: &Value) -> Result<Value, DocumentError> {
    section(topic, EXERCISE_CONTENT_INDEX, "topic")?
        .get("content")
        .cloned()
        .ok_or_else(|| {
            DocumentError::MissingSection(format!("topic: topics[{EXERCISE_CONTENT_INDEX}].content"))
        })
}

/// What an extraction produced for one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSummary {
    /// Course title.
    pub title: String,
    /// Topics saved.
    pub topics: usize,
    /// Topics skipped because their exercise block was missing.
    pub skipped: usize,
    /// Questions across all saved topics.
    pub questions: usize,
    /// JSON archive.
    pub json_archive: Option<PathBuf>,
    /// PDF archive.
    pub pdf_archive: Option<PathBuf>,
}

/// Extracts exercises of configured courses to disk.
#[derive(Debug)]
pub struct ExerciseExtractor<'a> {
    client: &'a EducationClient,
    output_root: PathBuf,
    delay: Duration,
    fonts: FontSource,
}

impl<'a> ExerciseExtractor<'a> {
    /// Extractor writing under `output_root`.
    #[must_use]
    pub fn new(client: &'a EducationClient, output_root: impl Into<PathBuf>, delay: Duration) -> Self {
        Self {
            client,
            output_root: output_root.into(),
            delay,
            fonts: FontSource::detect(),
        }
    }

    /// Overrides the PDF font source.
    #[must_use]
    pub fn with_fonts(mut self, fonts: FontSource) -> Self {
        self.fonts = fonts;
        self
    }

    fn json_dir(&self, slug: &str) -> PathBuf {
        self.output_root.join("json").join(slug)
    }

    fn pdf_dir(&self, slug: &str) -> PathBuf {
        self.output_root.join("pdfs").join(slug)
    }

    /// Extracts every exercise topic of `course`.
    ///
    /// Topics without an exercise block or without a question list are
    /// skipped with a warning; API failures abort the course.
    #[instrument(skip(self), fields(course = course.id))]
    pub async fn extract_course(&self, course: &ExerciseCourse) -> Result<CourseSummary, EadError> {
        info!("📘 {}", course.title);
        let contents = self.client.get_contents(course.id).await?;
        let topics = list_topics(&contents)?;
        info!("🔍 {} topics found", topics.len());

        let json_dir = self.json_dir(&course.slug);
        let pdf_dir = self.pdf_dir(&course.slug);
        create_dir(&json_dir)?;
        create_dir(&pdf_dir)?;

        let mut summary = CourseSummary {
            title: course.title.clone(),
            topics: 0,
            skipped: 0,
            questions: 0,
            json_archive: None,
            pdf_archive: None,
        };

        for (index, topic) in topics.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            info!("📝 {}", topic.title);
            let response = self.client.get_exercises(course.id, topic.id).await?;
            let content = match exercise_content(&response) {
                Ok(content) => content,
                Err(e) => {
                    warn!(topic = topic.id, error = %e, "Skipping topic");
                    summary.skipped += 1;
                    continue;
                }
            };

            let set = ExerciseSet {
                discipline: course.title.clone(),
                title: topic.title.clone(),
                content,
            };
            let questions = match set.questions() {
                Ok(questions) => questions.len(),
                Err(e) => {
                    warn!(topic = topic.id, error = %e, "Skipping topic without questions");
                    summary.skipped += 1;
                    continue;
                }
            };
            self.save_set(&set, topic.id, &json_dir, &pdf_dir)?;
            summary.questions += questions;
            summary.topics += 1;
        }

        if summary.topics > 0 {
            summary.json_archive = Some(zip_directory(&json_dir)?);
            summary.pdf_archive = Some(zip_directory(&pdf_dir)?);
        }

        info!(
            topics = summary.topics,
            questions = summary.questions,
            "💾 {} saved",
            course.title
        );
        Ok(summary)
    }

    /// Writes the JSON dump and the PDF of one set.
    fn save_set(
        &self,
        set: &ExerciseSet,
        topic_id: u64,
        json_dir: &Path,
        pdf_dir: &Path,
    ) -> Result<(), DocumentError> {
        let json_path = json_dir.join(format!("{topic_id}.json"));
        let rendered = serde_json::to_string_pretty(set)?;
        fs::write(&json_path, rendered).map_err(|source| DocumentError::Io {
            path: json_path.clone(),
            source,
        })?;

        let pdf_path = pdf_dir.join(format!("{}.pdf", file_stem(&set.title)));
        render_pdf(set, &pdf_path, &self.fonts)
    }
}

fn create_dir(path: &Path) -> Result<(), DocumentError> {
    fs::create_dir_all(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_topics_reads_third_section_children() {
        let contents = json!({
            "topics": [
                {"children": []},
                {"children": []},
                {"children": [{"id": 10, "title": "Aula 1"}, {"id": 11, "title": "Aula 2"}]}
            ]
        });
        assert_eq!(
            list_topics(&contents).unwrap(),
            vec![
                TopicRef { id: 10, title: "Aula 1".to_string() },
                TopicRef { id: 11, title: "Aula 2".to_string() },
            ]
        );
    }

    #[test]
    fn test_list_topics_missing_section() {
        let err = list_topics(&json!({"topics": [{}]})).unwrap_err();
        assert!(matches!(err, DocumentError::MissingSection(_)));
    }

    #[test]
    fn test_exercise_content_reads_fifth_section() {
        let topic = json!({"topics": [{}, {}, {}, {}, {"content": {"questions": []}}]});
        assert_eq!(exercise_content(&topic).unwrap(), json!({"questions": []}));
        assert!(exercise_content(&json!({"topics": []})).is_err());
    }

    #[test]
    fn test_correct_option_letter() {
        let question: Question = serde_json::from_value(json!({
            "enunciated": "x",
            "options": [
                {"text": "a", "isCorrect": false},
                {"text": "b", "isCorrect": false},
                {"text": "c", "isCorrect": true, "feedback": "why"}
            ]
        }))
        .unwrap();
        let (letter, option) = question.correct_option().unwrap();
        assert_eq!(letter, 'C');
        assert_eq!(option.feedback, "why");
    }
}
