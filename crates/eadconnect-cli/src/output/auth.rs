// SPDX-License-Identifier: Apache-2.0

use console::style;
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::AuthStatusResult;

use super::Renderable;

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

impl Renderable for AuthStatusResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        if self.authenticated {
            writeln!(
                w,
                "{} Authenticated at {}",
                style("*").green().bold(),
                style(&self.institution).cyan()
            )?;
            if let Some(ref name) = self.name {
                writeln!(w, "  Name: {}", style(name).cyan())?;
            }
            if let Some(ref email) = self.email {
                writeln!(w, "  E-mail: {}", style(email).cyan())?;
            }
        } else {
            writeln!(
                w,
                "{} Not authenticated. Run {} to log in.",
                style("!").yellow().bold(),
                style("eadconnect auth login").cyan()
            )?;
        }
        if ctx.verbose {
            if let Some(ref username) = self.username {
                writeln!(w, "  Username: {username}")?;
            }
            writeln!(w, "  Academic token stored: {}", yes_no(self.access_token_stored))?;
            writeln!(w, "  App token stored: {}", yes_no(self.app_token_stored))?;
        }
        writeln!(w)?;
        Ok(())
    }
}
