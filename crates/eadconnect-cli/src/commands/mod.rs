// SPDX-License-Identifier: Apache-2.0

//! Command handlers for the EADConnect CLI.

pub mod academic;
pub mod auth;
pub mod completion;
pub mod exercises;
pub mod finance;
pub mod monitor;
pub mod types;

use std::borrow::Cow;
use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;

use anyhow::Result;
use console::style;
use eadconnect_core::AppConfig;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{AuthCommand, Commands, CompletionCommand, OutputContext, OutputFormat};
use crate::output;
use crate::session;

/// Creates a styled spinner (only if interactive).
fn maybe_spinner(ctx: &OutputContext, message: &str) -> Option<ProgressBar> {
    if !ctx.is_interactive() {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

/// Awaits `task` behind a spinner.
async fn with_spinner<T>(
    ctx: &OutputContext,
    message: &str,
    task: impl Future<Output = Result<T>>,
) -> Result<T> {
    let spinner = maybe_spinner(ctx, message);
    let result = task.await;
    if let Some(s) = spinner {
        s.finish_and_clear();
    }
    result
}

/// Dispatch to the appropriate command handler.
///
/// Anything that may prompt runs here, before a spinner starts.
pub async fn run(command: Commands, ctx: OutputContext, config: &AppConfig) -> Result<()> {
    let stdin_is_terminal = std::io::stdin().is_terminal();
    let config = if command.needs_session() {
        session::ensure_credentials(config, stdin_is_terminal)?
    } else {
        Cow::Borrowed(config)
    };
    let config = config.as_ref();

    match command {
        Commands::Auth(auth_cmd) => match auth_cmd {
            AuthCommand::Login => {
                let result = auth::run_login(config).await?;
                output::render(&result, &ctx)
            }
            AuthCommand::Logout => {
                auth::run_logout()?;
                if matches!(ctx.format, OutputFormat::Text) {
                    println!("{} Stored sessions removed.", style("*").green().bold());
                }
                Ok(())
            }
            AuthCommand::Status => {
                let result = with_spinner(&ctx, "Checking session...", auth::run_status(config)).await?;
                output::render(&result, &ctx)
            }
        },

        Commands::Courses { all, latest_period } => {
            let result = with_spinner(
                &ctx,
                "Fetching courses...",
                academic::courses(config, all, latest_period),
            )
            .await?;
            output::render(&result, &ctx)
        }

        Commands::Grades { latest_period } => {
            let result = with_spinner(
                &ctx,
                "Fetching grades...",
                academic::grades(config, latest_period),
            )
            .await?;
            output::render(&result, &ctx)
        }

        Commands::Messages { page, per_page } => {
            let result = with_spinner(
                &ctx,
                "Fetching messages...",
                academic::messages(config, page, per_page),
            )
            .await?;
            output::render(&result, &ctx)
        }

        Commands::Notices { course } => {
            let result =
                with_spinner(&ctx, "Fetching notices...", academic::notices(config, course))
                    .await?;
            output::render(&result, &ctx)
        }

        Commands::Calendar { types: true, .. } => {
            let result = with_spinner(
                &ctx,
                "Fetching appointment types...",
                academic::appointment_types(config),
            )
            .await?;
            output::render(&result, &ctx)
        }

        Commands::Calendar { start, end, .. } => {
            let result = with_spinner(
                &ctx,
                "Fetching calendar...",
                academic::calendar(config, start, end),
            )
            .await?;
            output::render(&result, &ctx)
        }

        Commands::Exercises => {
            let result = exercises::run(config, &ctx).await?;
            output::render(&result, &ctx)
        }

        Commands::Monitor { interval } => monitor::run(config, interval).await,

        Commands::Finance(finance_cmd) => {
            if !finance::confirm(&finance_cmd, stdin_is_terminal)? {
                if matches!(ctx.format, OutputFormat::Text) {
                    println!("{} Cancelled.", style("!").yellow().bold());
                }
                return Ok(());
            }
            let result = with_spinner(
                &ctx,
                "Fetching financial data...",
                finance::run(config, finance_cmd),
            )
            .await?;
            output::render(&result, &ctx)
        }

        Commands::Completion(completion_cmd) => match completion_cmd {
            CompletionCommand::Generate { shell } => completion::run_generate(shell),
        },
    }
}
