// SPDX-License-Identifier: Apache-2.0

use console::style;
use serde_json::Value;
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::{FinanceResult, list_items};

use super::Renderable;
use super::common::{new_table, scalar, truncate};

impl Renderable for FinanceResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "{}", style(&self.title).bold())?;

        match &self.data {
            Value::Object(map) if !map.contains_key("data") && !map.contains_key("items") => {
                let mut table = new_table(&["Field", "Value"]);
                for (key, value) in map {
                    table.add_row(vec![key.clone(), truncate(&scalar(Some(value)))]);
                }
                writeln!(w, "{table}")
            }
            other => {
                let items = list_items(other.clone());
                if items.is_empty() {
                    return writeln!(w, "{}", style("Nothing to show.").dim());
                }
                for item in &items {
                    writeln!(w, "- {}", truncate(&scalar(Some(item))))?;
                }
                Ok(())
            }
        }
    }
}
