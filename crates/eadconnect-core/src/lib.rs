// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # EADConnect Core
//!
//! Core library for the EADConnect CLI - a client for the Grupo A education
//! platform.
//!
//! This crate provides reusable components for:
//! - Platform API access (academic and financial endpoints)
//! - Session authentication with on-disk token reuse
//! - Grade monitoring with Telegram notifications
//! - Exercise extraction to JSON, PDF and zip archives
//! - Configuration management
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eadconnect_core::{
//!     AuthPolicy, Credentials, EducationClient, TokenKind, TokenStore, authenticate,
//!     load_config,
//! };
//! use secrecy::SecretString;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = load_config()?;
//! let credentials = Credentials::new("student", SecretString::from("secret"), "faesa");
//! let mut client = EducationClient::new(credentials, &config.http)?;
//!
//! let store = TokenStore::for_kind(TokenKind::Access);
//! authenticate(&mut client, &store, &AuthPolicy::from(&config.auth)).await?;
//!
//! let profile = client.get_me().await?;
//! println!("Hello, {:?}", profile.user.name);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`client`] - Platform API client
//! - [`auth`] - Token validation and login
//! - [`monitor`] - Grade change monitor
//! - [`exercises`] - Exercise extraction and documents
//! - [`config`] - Configuration loading and paths
//! - [`error`] - Error types

// ============================================================================
// Error Handling
// ============================================================================

pub use error::{ApiError, AuthError, DocumentError, EadError, NotifyError, StoreError};

/// Convenience Result type for EADConnect operations.
///
/// This is equivalent to `std::result::Result<T, EadError>`.
pub type Result<T> = std::result::Result<T, EadError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AcademicConfig, AppConfig, AuthConfig, ExerciseCourse, ExercisesConfig, HttpConfig,
    MonitorConfig, TelegramConfig, config_dir, config_file_path, data_dir, load_config,
    save_credentials,
};

// ============================================================================
// API Client
// ============================================================================

pub use client::{Credentials, EducationClient};
pub use endpoints::{API_BASE_URL, AuthScope, Endpoint};
pub use models::{
    Course, CoursesPage, CoursesQuery, DebtsQuery, GradeReport, Period, Profile, TokenResponse,
    UserInfo,
};

// ============================================================================
// Authentication
// ============================================================================

pub use auth::{AuthPolicy, authenticate, extract_app_token, is_token_valid, logout};
pub use token_store::{TokenKind, TokenStore};

// ============================================================================
// Academic
// ============================================================================

pub use academic::{AcademicService, GradeChange, calendar_range, detect_grade_changes};

// ============================================================================
// Grade Monitor
// ============================================================================

pub use monitor::{
    CycleOutcome, FirstSeen, GradeMonitor, GradeSnapshot, MonitorSettings, NotificationEvent,
    SnapshotCache, diff_snapshots,
};
pub use notify::{LogNotifier, MessageId, Notifier, TelegramNotifier};

// ============================================================================
// Exercises
// ============================================================================

pub use exercises::{CourseSummary, ExerciseExtractor, ExerciseSet, FontSource};

// ============================================================================
// Modules
// ============================================================================

pub mod academic;
pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod exercises;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod retry;
pub mod token_store;
