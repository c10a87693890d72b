// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for EADConnect.
//!
//! Uses clap's derive API with noun-verb subcommands where a noun has more
//! than one action (`auth`, `finance`, `completion`).

use std::io::IsTerminal;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Extended help text for the generate subcommand with shell-specific examples.
const COMPLETION_GENERATE_HELP: &str = r#"EXAMPLES

  bash
    Add to ~/.bashrc or ~/.bash_profile:
      eval "$(eadconnect completion generate bash)"

  zsh
    mkdir -p ~/.zsh/completions
    eadconnect completion generate zsh > ~/.zsh/completions/_eadconnect

  fish
    eadconnect completion generate fish > ~/.config/fish/completions/eadconnect.fish
"#;

/// Output format for CLI results.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors (default)
    #[default]
    Text,
    /// JSON output for programmatic consumption
    Json,
}

/// Global output configuration passed to commands.
#[derive(Clone, Debug)]
pub struct OutputContext {
    /// Output format
    pub format: OutputFormat,
    /// Enable verbose output
    pub verbose: bool,
    /// Whether stdout is a terminal (TTY)
    pub is_tty: bool,
}

impl OutputContext {
    /// Creates an `OutputContext` from CLI arguments.
    pub fn from_cli(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            is_tty: std::io::stdout().is_terminal(),
        }
    }

    /// Returns true if interactive elements (spinners, prompts) may be shown.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && matches!(self.format, OutputFormat::Text)
    }
}

/// Parses a `YYYY-MM-DD` date argument.
pub fn parse_date(value: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

/// Parses a JSON argument.
pub fn parse_json(value: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(value).map_err(|e| format!("invalid JSON: {e}"))
}

/// EADConnect - grades, courses and exercises from the Grupo A platform.
///
/// Logs in with your student credentials, reuses the session between runs,
/// and can watch your grades and notify you on Telegram when they change.
#[derive(Parser, Debug)]
#[command(name = "eadconnect")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Output format (text, json)
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    pub output: OutputFormat,

    /// Enable verbose output (debug-level logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the platform session
    #[command(subcommand)]
    Auth(AuthCommand),

    /// List your courses
    Courses {
        /// Include past and future courses
        #[arg(long)]
        all: bool,

        /// Use the most recent period instead of the configured one
        #[arg(long)]
        latest_period: bool,
    },

    /// Show final grades of the running term
    Grades {
        /// Use the most recent period instead of the configured one
        #[arg(long)]
        latest_period: bool,
    },

    /// Show the latest message of each inbox conversation
    Messages {
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Conversations per page
        #[arg(long, default_value_t = 15)]
        per_page: u32,
    },

    /// Show the notices board
    Notices {
        /// Only highlighted notices of this course
        #[arg(long)]
        course: Option<u64>,
    },

    /// Show calendar appointments
    Calendar {
        /// First day (YYYY-MM-DD, default today)
        #[arg(long, value_parser = parse_date)]
        start: Option<chrono::NaiveDate>,

        /// Last day (YYYY-MM-DD, default 30 days after start)
        #[arg(long, value_parser = parse_date)]
        end: Option<chrono::NaiveDate>,

        /// List appointment types instead of appointments
        #[arg(long, conflicts_with_all = ["start", "end"])]
        types: bool,
    },

    /// Extract exercises of the configured courses to JSON, PDF and zip
    Exercises,

    /// Watch grades and notify changes
    Monitor {
        /// Minutes between checks (overrides config)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Financial information from the service portal
    #[command(subcommand)]
    Finance(FinanceCommand),

    /// Generate shell completion scripts
    #[command(subcommand)]
    Completion(CompletionCommand),
}

impl Commands {
    /// Whether the command logs in to the platform.
    pub fn needs_session(&self) -> bool {
        !matches!(
            self,
            Self::Completion(_) | Self::Auth(AuthCommand::Logout | AuthCommand::Status)
        )
    }
}

/// Authentication subcommands
#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Log in and store the session token
    Login,

    /// Remove stored session tokens
    Logout,

    /// Show current authentication status
    Status,
}

/// Finance subcommands
#[derive(Subcommand, Debug)]
pub enum FinanceCommand {
    /// Student record
    Info,

    /// Debts
    Debts {
        /// Status filter
        #[arg(long, default_value = "pending")]
        status: String,
    },

    /// Slip of a debt contract
    Slip {
        /// Contract id
        contract_id: u64,
    },

    /// Available payment methods
    Methods,

    /// Payment settings
    Settings,

    /// Create a PIX charge
    Pay {
        /// Charge body as JSON
        #[arg(long, value_parser = parse_json)]
        data: serde_json::Value,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Completion subcommands
#[derive(Subcommand, Debug)]
pub enum CompletionCommand {
    /// Generate completion script for a shell (output to stdout)
    #[command(after_long_help = COMPLETION_GENERATE_HELP)]
    Generate {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date("2025-03-01").unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert!(parse_date("01/03/2025").is_err());
    }

    #[test]
    fn test_calendar_dates_are_parsed() {
        let cli = Cli::try_parse_from([
            "eadconnect",
            "calendar",
            "--start",
            "2025-01-01",
            "--end",
            "2025-01-31",
        ])
        .unwrap();
        match cli.command {
            Commands::Calendar { start, end, types } => {
                assert!(!types);
                assert_eq!(start, chrono::NaiveDate::from_ymd_opt(2025, 1, 1));
                assert_eq!(end, chrono::NaiveDate::from_ymd_opt(2025, 1, 31));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_output_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["eadconnect", "grades", "--output", "json"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_calendar_types_conflicts_with_dates() {
        assert!(Cli::try_parse_from(["eadconnect", "calendar", "--types"]).is_ok());
        assert!(
            Cli::try_parse_from(["eadconnect", "calendar", "--types", "--start", "2025-01-01"])
                .is_err()
        );
    }

    #[test]
    fn test_finance_pay_requires_json_body() {
        let cli = Cli::try_parse_from([
            "eadconnect",
            "finance",
            "pay",
            "--data",
            r#"{"debts": [7]}"#,
            "-y",
        ])
        .unwrap();
        match cli.command {
            Commands::Finance(FinanceCommand::Pay { data, yes }) => {
                assert_eq!(data["debts"][0], 7);
                assert!(yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["eadconnect", "finance", "pay", "--data", "{"]).is_err());
    }

    #[test]
    fn test_needs_session() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).unwrap().command;
        assert!(parse(&["eadconnect", "grades"]).needs_session());
        assert!(parse(&["eadconnect", "auth", "login"]).needs_session());
        assert!(!parse(&["eadconnect", "auth", "status"]).needs_session());
        assert!(!parse(&["eadconnect", "auth", "logout"]).needs_session());
        assert!(!parse(&["eadconnect", "completion", "generate", "bash"]).needs_session());
    }
}
