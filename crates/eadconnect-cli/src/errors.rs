// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to the library error types and appends a tip
//! for the cases a user can act on.

use anyhow::Error;
use eadconnect_core::{ApiError, AuthError, EadError, NotifyError, StoreError};

/// Formats an error for CLI display with helpful hints.
pub fn format_error(error: &Error) -> String {
    if let Some(err) = error.downcast_ref::<EadError>() {
        return match err {
            EadError::Api(api) => format_api_error(api),
            EadError::Auth(auth) => format_auth_error(auth),
            EadError::Store(store) => format_store_error(store),
            EadError::Notify(notify) => format_notify_error(notify),
            EadError::Config { .. } => format!(
                "{err}\n\nTip: Check your config file at {}",
                eadconnect_core::config_file_path().display()
            ),
            EadError::Document(_) => {
                format!("{err}\n\nTip: Check the exercises output directory and try again.")
            }
        };
    }
    if let Some(auth) = error.downcast_ref::<AuthError>() {
        return format_auth_error(auth);
    }
    if let Some(api) = error.downcast_ref::<ApiError>() {
        return format_api_error(api);
    }
    if let Some(notify) = error.downcast_ref::<NotifyError>() {
        return format_notify_error(notify);
    }
    format!("{error:#}")
}

fn format_api_error(err: &ApiError) -> String {
    match err {
        ApiError::Status { status: 401 | 403, .. } => format!(
            "{err}\n\nTip: Your session may have expired. Run `eadconnect auth login` again."
        ),
        ApiError::Status { status, .. } if *status >= 500 => {
            format!("{err}\n\nTip: The platform is having trouble. Try again in a moment.")
        }
        ApiError::Transport(_) => {
            format!("{err}\n\nTip: Check your internet connection and try again.")
        }
        ApiError::MissingToken(_) => {
            format!("{err}\n\nTip: Run `eadconnect auth login` first.")
        }
        _ => err.to_string(),
    }
}

fn format_auth_error(err: &AuthError) -> String {
    match err {
        AuthError::Api(ApiError::Status { status: 400 | 401, .. })
        | AuthError::NoAccessToken(_) => format!(
            "{err}\n\nTip: Check auth.username, auth.password and auth.institution in {}",
            eadconnect_core::config_file_path().display()
        ),
        AuthError::AttemptsExhausted { .. } | AuthError::Rejected(_) => format!(
            "{err}\n\nTip: The platform keeps rejecting new sessions. Try again later or run `eadconnect auth logout`."
        ),
        AuthError::MissingCredentials(field) => format!(
            "{err}\n\nTip: Run `eadconnect auth login` in a terminal or set EADCONNECT_{}.",
            field.replace('.', "__").to_uppercase()
        ),
        AuthError::Api(api) => format_api_error(api),
        AuthError::Store(store) => format_store_error(store),
    }
}

fn format_store_error(err: &StoreError) -> String {
    format!(
        "{err}\n\nTip: Check permissions of {}",
        eadconnect_core::data_dir().display()
    )
}

fn format_notify_error(err: &NotifyError) -> String {
    match err {
        NotifyError::NotConfigured(key) => format!(
            "{err}\n\nTip: Set {key} in {}",
            eadconnect_core::config_file_path().display()
        ),
        NotifyError::Telegram { .. } => {
            format!("{err}\n\nTip: Check the bot token and that the bot can write to the chat.")
        }
        NotifyError::Network(_) => {
            format!("{err}\n\nTip: Check your internet connection and try again.")
        }
    }
}
