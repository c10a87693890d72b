// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the EADConnect CLI.
//!
//! Uses `tracing` with `tracing-subscriber`, writing to stderr so that
//! `--output json` keeps stdout clean. `RUST_LOG` takes precedence over the
//! built-in filters.
//!
//! ```bash
//! # Trace HTTP calls as well
//! RUST_LOG=eadconnect_core=trace,reqwest=debug eadconnect grades
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::OutputFormat;

const DEFAULT_FILTER: &str = "eadconnect=info,eadconnect_core=info,reqwest=warn";
const VERBOSE_FILTER: &str = "eadconnect=debug,eadconnect_core=debug,reqwest=warn";
const QUIET_FILTER: &str = "eadconnect=warn,eadconnect_core=warn,reqwest=error";

/// Default filter directives for the given flags.
fn default_filter(format: OutputFormat, verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else if matches!(format, OutputFormat::Json) {
        QUIET_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Initialize the logging subsystem.
pub fn init_logging(format: OutputFormat, verbose: bool) {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(format, verbose)));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_wins_over_format() {
        assert_eq!(default_filter(OutputFormat::Json, true), VERBOSE_FILTER);
        assert_eq!(default_filter(OutputFormat::Json, false), QUIET_FILTER);
        assert_eq!(default_filter(OutputFormat::Text, false), DEFAULT_FILTER);
    }
}
