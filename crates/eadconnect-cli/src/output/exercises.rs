// SPDX-License-Identifier: Apache-2.0

use console::style;
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::ExercisesResult;

use super::Renderable;
use super::common::new_table;

impl Renderable for ExercisesResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        if !self.courses.is_empty() {
            let mut table = new_table(&["Course", "Topics", "Skipped", "Questions"]);
            for summary in &self.courses {
                table.add_row(vec![
                    summary.title.clone(),
                    summary.topics.to_string(),
                    summary.skipped.to_string(),
                    summary.questions.to_string(),
                ]);
            }
            writeln!(w, "{table}")?;
        }

        if ctx.verbose {
            for summary in &self.courses {
                for archive in [&summary.json_archive, &summary.pdf_archive].into_iter().flatten() {
                    writeln!(w, "  {}", style(archive.display()).dim())?;
                }
            }
        }

        for failed in &self.failed {
            writeln!(
                w,
                "{} {}: {}",
                style("x").red().bold(),
                failed.title,
                failed.error
            )?;
        }

        writeln!(
            w,
            "{} Output written to {}",
            style("*").green().bold(),
            style(&self.output_dir).cyan()
        )
    }
}
