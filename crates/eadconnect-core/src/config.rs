// SPDX-License-Identifier: Apache-2.0

//! Configuration management for EADConnect.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `EADCONNECT_`)
//! 2. Config file: `~/.config/eadconnect/config.toml`
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Poll grades every five minutes
//! EADCONNECT_MONITOR__INTERVAL_MINUTES=5 eadconnect monitor
//! ```

use std::fs;
use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::endpoints::API_BASE_URL;
use crate::error::EadError;
use crate::models::DEFAULT_PERIOD;

const APP_DIR: &str = "eadconnect";

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Student credentials.
    pub auth: AuthConfig,
    /// HTTP client settings.
    pub http: HttpConfig,
    /// Academic query settings.
    pub academic: AcademicConfig,
    /// Grade monitor settings.
    pub monitor: MonitorConfig,
    /// Exercise extraction settings.
    pub exercises: ExercisesConfig,
}

/// Student credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Platform username.
    pub username: Option<String>,
    /// Platform password (plaintext in the config file).
    pub password: Option<String>,
    /// Institution slug.
    pub institution: String,
    /// Full login cycles before giving up.
    pub max_attempts: u32,
    /// Pause between login cycles in seconds.
    pub backoff_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            institution: "faesa".to_string(),
            max_attempts: crate::retry::DEFAULT_MAX_ATTEMPTS,
            backoff_seconds: crate::retry::DEFAULT_BACKOFF.as_secs(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// API origin.
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Pause between consecutive per-course requests in seconds.
    pub request_delay_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_base_url: API_BASE_URL.to_string(),
            timeout_seconds: 10,
            request_delay_seconds: 2,
        }
    }
}

/// Academic query settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AcademicConfig {
    /// Period id sent with the courses query.
    pub period: u64,
}

impl Default for AcademicConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
        }
    }
}

/// Grade monitor settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Minutes between polling cycles.
    pub interval_minutes: u64,
    /// Seconds before the "no changes" notice is deleted.
    pub no_change_ttl_seconds: u64,
    /// Notify for disciplines missing from the cache (compared against `0`).
    pub notify_new_disciplines: bool,
    /// Grade cache location; defaults to the data directory.
    pub cache_file: Option<PathBuf>,
    /// Telegram Bot API settings.
    pub telegram: TelegramConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 2,
            no_change_ttl_seconds: 30,
            notify_new_disciplines: true,
            cache_file: None,
            telegram: TelegramConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Resolved grade cache path.
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.cache_file
            .clone()
            .unwrap_or_else(|| data_dir().join("grades_cache.json"))
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token.
    pub bot_token: Option<String>,
    /// Destination chat.
    pub chat_id: Option<String>,
    /// Bot API origin.
    pub api_base_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base_url: "https://api.telegram.org".to_string(),
        }
    }
}

/// Exercise extraction settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExercisesConfig {
    /// Courses to extract.
    pub courses: Vec<ExerciseCourse>,
    /// Output root; defaults to the data directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for ExercisesConfig {
    fn default() -> Self {
        Self {
            courses: vec![
                ExerciseCourse {
                    id: 3_187_911,
                    title: "Fundamentos de Redes de Computadores".to_string(),
                    slug: "fundamentos_de_redes_de_computadores".to_string(),
                },
                ExerciseCourse {
                    id: 3_187_728,
                    title: "Gestão de Projetos".to_string(),
                    slug: "gestao_de_projetos".to_string(),
                },
            ],
            output_dir: None,
        }
    }
}

impl ExercisesConfig {
    /// Resolved output root.
    #[must_use]
    pub fn output_root(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(data_dir)
    }
}

/// A course whose exercises are extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseCourse {
    /// Course id.
    pub id: u64,
    /// Display title.
    pub title: String,
    /// Directory/archive name.
    pub slug: String,
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the EADConnect configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/eadconnect`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join(APP_DIR);
    }
    home_dir().join(".config").join(APP_DIR)
}

/// Returns the EADConnect data directory.
///
/// Respects the `XDG_DATA_HOME` environment variable if set,
/// otherwise defaults to `~/.local/share/eadconnect`.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME")
        && !xdg_data.is_empty()
    {
        return PathBuf::from(xdg_data).join(APP_DIR);
    }
    home_dir().join(".local").join("share").join(APP_DIR)
}

/// Returns the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application configuration.
///
/// Loads from config file (if exists) and environment variables.
/// Environment variables use the prefix `EADCONNECT_` and double underscore
/// for nested keys (e.g., `EADCONNECT_AUTH__INSTITUTION`).
///
/// # Errors
///
/// Returns `EadError::Config` if the config file exists but is invalid.
pub fn load_config() -> Result<AppConfig, EadError> {
    let config_path = config_file_path();

    let config = Config::builder()
        .add_source(File::with_name(config_path.to_string_lossy().as_ref()).required(false))
        .add_source(
            Environment::with_prefix("EADCONNECT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    Ok(app_config)
}

/// Writes credentials into the `[auth]` table of the config file.
///
/// Other tables and keys already present in the file are preserved.
///
/// # Errors
///
/// Returns `EadError::Config` if the existing file is not valid TOML or
/// cannot be written.
pub fn save_credentials(username: &str, password: &str, institution: &str) -> Result<(), EadError> {
    let path = config_file_path();
    let config_error = |message: String| EadError::Config { message };

    let mut document: toml::Table = if path.exists() {
        let raw = fs::read_to_string(&path)
            .map_err(|e| config_error(format!("Failed to read {}: {e}", path.display())))?;
        raw.parse()
            .map_err(|e| config_error(format!("Failed to parse {}: {e}", path.display())))?
    } else {
        toml::Table::new()
    };

    let auth = document
        .entry("auth")
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    let toml::Value::Table(auth) = auth else {
        return Err(config_error("[auth] is not a table".to_string()));
    };
    auth.insert("username".into(), username.into());
    auth.insert("password".into(), password.into());
    auth.insert("institution".into(), institution.trim().to_lowercase().into());

    let rendered = toml::to_string_pretty(&document)
        .map_err(|e| config_error(format!("Failed to render config: {e}")))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| config_error(format!("Failed to create {}: {e}", parent.display())))?;
    }
    fs::write(&path, rendered)
        .map_err(|e| config_error(format!("Failed to write {}: {e}", path.display())))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn parse(config_str: &str) -> AppConfig {
        Config::builder()
            .add_source(config::File::from_str(config_str, config::FileFormat::Toml))
            .build()
            .expect("should build config")
            .try_deserialize()
            .expect("should deserialize")
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.auth.institution, "faesa");
        assert_eq!(config.auth.max_attempts, 3);
        assert_eq!(config.http.api_base_url, API_BASE_URL);
        assert_eq!(config.http.timeout_seconds, 10);
        assert_eq!(config.http.request_delay_seconds, 2);
        assert_eq!(config.academic.period, 11903);
        assert_eq!(config.monitor.interval_minutes, 2);
        assert_eq!(config.monitor.no_change_ttl_seconds, 30);
        assert!(config.monitor.notify_new_disciplines);
        assert_eq!(config.exercises.courses.len(), 2);
        assert_eq!(config.exercises.courses[0].id, 3_187_911);
    }

    #[test]
    fn test_partial_file_keeps_section_defaults() {
        let config = parse(
            r#"
[auth]
username = "student"
password = "secret"

[monitor.telegram]
bot_token = "123:abc"
chat_id = "42"
"#,
        );

        assert_eq!(config.auth.username.as_deref(), Some("student"));
        assert_eq!(config.auth.institution, "faesa");
        assert_eq!(config.monitor.telegram.chat_id.as_deref(), Some("42"));
        assert_eq!(config.monitor.telegram.api_base_url, "https://api.telegram.org");
        assert_eq!(config.monitor.interval_minutes, 2);
    }

    #[test]
    fn test_exercise_course_list_override() {
        let config = parse(
            r#"
[[exercises.courses]]
id = 1
title = "Redes"
slug = "redes"
"#,
        );

        assert_eq!(
            config.exercises.courses,
            vec![ExerciseCourse {
                id: 1,
                title: "Redes".to_string(),
                slug: "redes".to_string(),
            }]
        );
    }

    #[test]
    #[serial]
    fn test_config_dir_respects_xdg_config_home() {
        let original = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", "/custom/config");
        }

        assert_eq!(config_dir(), PathBuf::from("/custom/config/eadconnect"));
        assert!(config_file_path().ends_with("eadconnect/config.toml"));

        unsafe {
            match original {
                Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
                None => std::env::remove_var("XDG_CONFIG_HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_data_dir_ignores_empty_xdg_data_home() {
        let original = std::env::var("XDG_DATA_HOME").ok();
        unsafe {
            std::env::set_var("XDG_DATA_HOME", "");
        }

        assert!(data_dir().ends_with("eadconnect"));

        unsafe {
            match original {
                Some(val) => std::env::set_var("XDG_DATA_HOME", val),
                None => std::env::remove_var("XDG_DATA_HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_save_credentials_preserves_other_tables() {
        let dir = tempfile::tempdir().unwrap();
        let original = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", dir.path());
        }

        let path = config_file_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[monitor]\ninterval_minutes = 5\n").unwrap();

        save_credentials("student", "secret", "FAESA").unwrap();

        let written = parse(&fs::read_to_string(&path).unwrap());
        assert_eq!(written.auth.username.as_deref(), Some("student"));
        assert_eq!(written.auth.password.as_deref(), Some("secret"));
        assert_eq!(written.auth.institution, "faesa");
        assert_eq!(written.monitor.interval_minutes, 5);

        unsafe {
            match original {
                Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
                None => std::env::remove_var("XDG_CONFIG_HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let original = std::env::var("EADCONNECT_MONITOR__INTERVAL_MINUTES").ok();
        unsafe {
            std::env::set_var("EADCONNECT_MONITOR__INTERVAL_MINUTES", "7");
        }

        let config = load_config().expect("should load");
        assert_eq!(config.monitor.interval_minutes, 7);

        unsafe {
            match original {
                Some(val) => std::env::set_var("EADCONNECT_MONITOR__INTERVAL_MINUTES", val),
                None => std::env::remove_var("EADCONNECT_MONITOR__INTERVAL_MINUTES"),
            }
        }
    }
}
