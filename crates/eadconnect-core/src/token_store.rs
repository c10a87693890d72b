// SPDX-License-Identifier: Apache-2.0

//! On-disk persistence of platform tokens.
//!
//! One JSON file per credential kind, shaped `{"accessToken": "<t>"}` or
//! `{"accessToken": null}`. The file is never deleted; clearing a token
//! writes `null`.

use std::fmt;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache;
use crate::config::data_dir;
use crate::error::StoreError;

/// Named credential kinds with independent storage and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Academic access token.
    Access,
    /// Elevated token for the academic-services/financial portal.
    App,
}

impl TokenKind {
    /// File name of this credential under the data directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            TokenKind::Access => "credentials.json",
            TokenKind::App => "app_credentials.json",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access token"),
            TokenKind::App => write!(f, "app access token"),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredToken {
    #[serde(default)]
    access_token: Option<String>,
}

/// JSON file holding one token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
    kind: TokenKind,
}

impl TokenStore {
    /// Store at an explicit path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: TokenKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Store at the default location for `kind`.
    #[must_use]
    pub fn for_kind(kind: TokenKind) -> Self {
        Self::new(data_dir().join(kind.file_name()), kind)
    }

    /// Both default stores, academic first.
    #[must_use]
    pub fn defaults() -> [Self; 2] {
        [Self::for_kind(TokenKind::Access), Self::for_kind(TokenKind::App)]
    }

    /// Credential kind held by this store.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted token.
    ///
    /// A missing file, a missing/null/empty field, and an unreadable file
    /// all yield `None`; the last one is logged.
    #[must_use]
    pub fn load(&self) -> Option<SecretString> {
        match cache::read_json::<StoredToken>(&self.path) {
            Ok(Some(stored)) => stored
                .access_token
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            Ok(None) => {
                debug!(path = %self.path.display(), "No stored {}", self.kind);
                None
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable {} file", self.kind);
                None
            }
        }
    }

    /// Persists `token`, or `null` when `None`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be written.
    pub fn save(&self, token: Option<&SecretString>) -> Result<(), StoreError> {
        let stored = StoredToken {
            access_token: token.map(|t| t.expose_secret().to_string()),
        };
        cache::write_json_atomic(&self.path, &stored)?;
        debug!(path = %self.path.display(), present = token.is_some(), "Saved {}", self.kind);
        Ok(())
    }
}
