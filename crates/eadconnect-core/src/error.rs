// SPDX-License-Identifier: Apache-2.0

//! Error types for EADConnect.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.

use std::path::PathBuf;

use thiserror::Error;

use crate::token_store::TokenKind;

/// Failure of a single platform API call.
///
/// Replaces the "parsed JSON or raw failed response" contract: a call either
/// yields its decoded body or one of these variants.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The platform answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        /// Logical endpoint name.
        endpoint: &'static str,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Network/HTTP error from reqwest (connect, timeout, TLS).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("Invalid response from {endpoint}: {source}")]
    Decode {
        /// Logical endpoint name.
        endpoint: &'static str,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The endpoint needs a token the client does not hold yet.
    #[error("No {0} available - authenticate first")]
    MissingToken(TokenKind),

    /// A token or institution value cannot be sent as an HTTP header.
    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),
}

impl ApiError {
    /// HTTP status code, when the platform answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether retrying the same call later could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(err) => err.is_timeout() || err.is_connect(),
            ApiError::Status { status, .. } => crate::retry::is_retryable_http(*status),
            _ => false,
        }
    }
}

/// Authentication failures. Fatal to the process.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Login or role assumption finished without yielding a token.
    #[error("Could not obtain {0}")]
    NoAccessToken(TokenKind),

    /// A freshly obtained token failed validation.
    #[error("Newly issued {0} was rejected by the platform")]
    Rejected(TokenKind),

    /// Every attempt failed validation.
    #[error("Authentication failed after {attempts} attempts")]
    AttemptsExhausted {
        /// Number of attempts made.
        attempts: u32,
    },

    /// Login-related API call failed.
    #[error("Login request failed: {0}")]
    Api(#[from] ApiError),

    /// Credentials are missing from config and were not provided.
    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),

    /// The token file could not be written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Whether the authenticator should start another attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            AuthError::Rejected(_) => true,
            AuthError::Api(err) => err.is_transient(),
            _ => false,
        }
    }
}

/// Local JSON state (tokens, grade cache) could not be read or written.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error.
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid JSON for the expected shape.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        /// File involved.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Notification delivery failures. Logged per event, never fatal.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Telegram accepted the request but reported a failure.
    #[error("Telegram API error: {description}")]
    Telegram {
        /// Description returned by the Bot API.
        description: String,
    },

    /// Network/HTTP error from reqwest.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Notifier is not configured.
    #[error("Notifier not configured: {0}")]
    NotConfigured(&'static str),
}

/// Exercise extraction and document generation failures.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Expected section missing from a contents/topic response.
    #[error("Exercise data missing: {0}")]
    MissingSection(String),

    /// Exercise content did not match the expected question layout.
    #[error("Malformed exercise content: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Filesystem error.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// PDF generation failed.
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    /// Zip archive creation failed.
    #[error("Zip archive failed: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Errors that can occur during EADConnect operations.
#[derive(Error, Debug)]
pub enum EadError {
    /// Platform API error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Authentication error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Local state error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Notification error.
    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// Exercise document error.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Configuration file error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },
}

impl From<config::ConfigError> for EadError {
    fn from(err: config::ConfigError) -> Self {
        EadError::Config {
            message: err.to_string(),
        }
    }
}
