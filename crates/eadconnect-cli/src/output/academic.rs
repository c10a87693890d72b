// SPDX-License-Identifier: Apache-2.0

use console::style;
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::{
    AppointmentTypesResult, CalendarResult, CoursesResult, GradesResult, MessagesResult,
    NoticesResult,
};

use super::Renderable;
use super::common::{field, new_table, scalar};

impl Renderable for CoursesResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        if self.courses.is_empty() {
            writeln!(w, "{}", style("No courses found.").yellow())?;
            return Ok(());
        }
        let mut table = new_table(&["ID", "Course", "Status", "Current"]);
        for course in &self.courses {
            table.add_row(vec![
                course.id.to_string(),
                course.name.clone(),
                course.status.clone(),
                if course.is_active() { "yes" } else { "-" }.to_string(),
            ]);
        }
        writeln!(w, "{table}")?;
        writeln!(
            w,
            "{}",
            style(format!("{} courses in period {}", self.courses.len(), self.period)).dim()
        )
    }
}

impl Renderable for GradesResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        if self.grades.is_empty() {
            writeln!(w, "{}", style("No active courses.").yellow())?;
            return Ok(());
        }
        let mut table = new_table(&["Discipline", "Final grade", "Since last check"]);
        for (discipline, grade) in &self.grades {
            let change = match self.changes.get(discipline) {
                Some(change) if change.before.is_none() => "new".to_string(),
                Some(change) => format!("was {}", scalar(change.before.as_ref())),
                None => String::new(),
            };
            table.add_row(vec![discipline.clone(), scalar(Some(grade)), change]);
        }
        writeln!(w, "{table}")
    }
}

impl Renderable for MessagesResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        if self.messages.is_empty() {
            writeln!(w, "{}", style("Inbox is empty.").yellow())?;
            return Ok(());
        }
        let mut table = new_table(&["From", "Subject", "Date"]);
        for message in &self.messages {
            table.add_row(vec![
                field(message, &["sender.name", "from.name", "senderName"]),
                field(message, &["subject", "title", "body", "text"]),
                field(message, &["createdAt", "sentAt", "date"]),
            ]);
        }
        writeln!(w, "{table}")
    }
}

impl Renderable for NoticesResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        if self.notices.is_empty() {
            writeln!(w, "{}", style("No notices.").yellow())?;
            return Ok(());
        }
        let mut table = new_table(&["Posted", "Title"]);
        for notice in &self.notices {
            table.add_row(vec![
                field(notice, &["postedAt", "createdAt"]),
                field(notice, &["title", "subject", "description"]),
            ]);
        }
        writeln!(w, "{table}")
    }
}

impl Renderable for CalendarResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(
            w,
            "{}",
            style(format!("Appointments {} .. {}", self.start, self.end)).bold()
        )?;
        if self.appointments.is_empty() {
            writeln!(w, "{}", style("Nothing scheduled.").dim())?;
            return Ok(());
        }
        let mut table = new_table(&["Start", "End", "Title", "Course"]);
        for item in &self.appointments {
            table.add_row(vec![
                field(item, &["startDate", "start"]),
                field(item, &["endDate", "end"]),
                field(item, &["title", "name", "description"]),
                field(item, &["course.name", "courseName"]),
            ]);
        }
        writeln!(w, "{table}")
    }
}

impl Renderable for AppointmentTypesResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        if self.types.is_empty() {
            writeln!(w, "{}", style("No appointment types.").yellow())?;
            return Ok(());
        }
        let mut table = new_table(&["ID", "Type"]);
        for item in &self.types {
            table.add_row(vec![
                field(item, &["id", "value"]),
                field(item, &["name", "description", "label"]),
            ]);
        }
        writeln!(w, "{table}")
    }
}
