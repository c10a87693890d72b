// SPDX-License-Identifier: Apache-2.0

//! Session authentication.
//!
//! The authenticator guarantees a valid token for one credential kind:
//! reuse the stored token when the platform still accepts it, otherwise run
//! a full login, persist the result and re-validate. Validation failures
//! restart the whole cycle up to a bounded number of attempts.

use std::time::Duration;

use backon::Retryable;
use reqwest::Url;
use secrecy::SecretString;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::client::EducationClient;
use crate::config::AuthConfig;
use crate::error::{AuthError, StoreError};
use crate::retry::{DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS, attempt_backoff};
use crate::token_store::{TokenKind, TokenStore};

/// How hard the authenticator tries.
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    /// Full cycles before giving up.
    pub max_attempts: u32,
    /// Pause between cycles.
    pub backoff: Duration,
    /// Persist freshly issued tokens.
    pub auto_save: bool,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            auto_save: true,
        }
    }
}

impl From<&AuthConfig> for AuthPolicy {
    fn from(config: &AuthConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: Duration::from_secs(config.backoff_seconds),
            auto_save: true,
        }
    }
}

/// Whether the platform accepts `token` for `kind`.
///
/// Never fails: transport errors, non-2xx answers and undecodable bodies
/// all count as invalid.
pub async fn is_token_valid(client: &EducationClient, kind: TokenKind, token: &SecretString) -> bool {
    let result = match kind {
        TokenKind::Access => client.check_me(token).await.map(|_| ()),
        TokenKind::App => client.check_app_token(token).await.map(|_| ()),
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "{kind} rejected");
            false
        }
    }
}

/// Returns a valid token for the store's credential kind and installs it on
/// the client.
///
/// The app token is obtained through the SSO launcher and therefore needs
/// the client to hold a valid academic token already.
///
/// # Errors
///
/// - `AuthError::NoAccessToken` when login or role assumption yields no token
/// - `AuthError::AttemptsExhausted` when every cycle produced a rejected token
/// - `AuthError::Api` when a login call fails permanently
/// - `AuthError::Store` when the token file cannot be written
#[instrument(skip_all, fields(kind = %store.kind()))]
pub async fn authenticate(
    client: &mut EducationClient,
    store: &TokenStore,
    policy: &AuthPolicy,
) -> Result<SecretString, AuthError> {
    let attempts = policy.max_attempts.max(1);
    let shared: &EducationClient = client;

    let result = (|| attempt(shared, store, policy))
        .retry(attempt_backoff(attempts, policy.backoff))
        .when(AuthError::is_retryable)
        .notify(|err, dur| {
            warn!(error = %err, delay = ?dur, "Authentication attempt failed, retrying");
        })
        .await;

    let token = match result {
        Ok(token) => token,
        Err(e) if e.is_retryable() => return Err(AuthError::AttemptsExhausted { attempts }),
        Err(e) => return Err(e),
    };

    client.set_token(store.kind(), Some(token.clone()));
    Ok(token)
}

/// One load/validate/login/persist/re-validate cycle.
async fn attempt(
    client: &EducationClient,
    store: &TokenStore,
    policy: &AuthPolicy,
) -> Result<SecretString, AuthError> {
    let kind = store.kind();

    if let Some(stored) = store.load() {
        if is_token_valid(client, kind, &stored).await {
            debug!("Stored {kind} is valid");
            return Ok(stored);
        }
        info!("Stored {kind} is no longer valid, logging in");
    }

    let token = match kind {
        TokenKind::Access => obtain_access_token(client).await?,
        TokenKind::App => obtain_app_token(client).await?,
    };

    if policy.auto_save {
        store.save(Some(&token))?;
    }

    if is_token_valid(client, kind, &token).await {
        info!("Obtained new {kind}");
        return Ok(token);
    }

    store.save(None)?;
    Err(AuthError::Rejected(kind))
}

/// Signin followed by role assumption.
async fn obtain_access_token(client: &EducationClient) -> Result<SecretString, AuthError> {
    let signin = client.login().await?;
    let signin_token = signin
        .token()
        .map(|t| SecretString::from(t.to_string()))
        .ok_or(AuthError::NoAccessToken(TokenKind::Access))?;

    let assumed = client.assume_role(&signin_token).await?;
    assumed
        .token()
        .map(|t| SecretString::from(t.to_string()))
        .ok_or(AuthError::NoAccessToken(TokenKind::Access))
}

async fn obtain_app_token(client: &EducationClient) -> Result<SecretString, AuthError> {
    let launcher = client.auth_app_launcher().await?;
    extract_app_token(&launcher)
        .map(SecretString::from)
        .ok_or(AuthError::NoAccessToken(TokenKind::App))
}

/// Pulls the app token out of an SSO launcher response.
///
/// Looks for an `accessToken` or `token` field, then for the same names as
/// query parameters of the returned `url`.
#[must_use]
pub fn extract_app_token(response: &Value) -> Option<String> {
    let non_empty = |v: &Value| v.as_str().filter(|s| !s.is_empty()).map(str::to_string);

    if let Some(token) = ["accessToken", "token"]
        .iter()
        .find_map(|key| response.get(*key).and_then(non_empty))
    {
        return Some(token);
    }

    let url = response.get("url").and_then(Value::as_str)?;
    let url = Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(key, value)| (key == "token" || key == "accessToken") && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// Clears every persisted token.
///
/// # Errors
///
/// Returns `StoreError` if any file cannot be written.
pub fn logout(stores: &[TokenStore]) -> Result<(), StoreError> {
    for store in stores {
        store.save(None)?;
        info!("Cleared {}", store.kind());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_app_token_from_field() {
        assert_eq!(
            extract_app_token(&json!({"accessToken": "a1"})).as_deref(),
            Some("a1")
        );
        assert_eq!(extract_app_token(&json!({"token": "t1"})).as_deref(), Some("t1"));
    }

    #[test]
    fn test_extract_app_token_from_url_query() {
        let response = json!({"url": "https://portal.example/launch?foo=1&token=xyz"});
        assert_eq!(extract_app_token(&response).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_extract_app_token_absent() {
        assert!(extract_app_token(&json!({"accessToken": ""})).is_none());
        assert!(extract_app_token(&json!({"url": "not a url"})).is_none());
        assert!(extract_app_token(&json!({})).is_none());
    }

    #[test]
    fn test_policy_from_config() {
        let config = AuthConfig {
            max_attempts: 5,
            backoff_seconds: 0,
            ..AuthConfig::default()
        };
        let policy = AuthPolicy::from(&config);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff, Duration::ZERO);
        assert!(policy.auto_save);
    }

    #[test]
    fn test_logout_nulls_every_store() {
        let dir = tempfile::tempdir().unwrap();
        let stores = [
            TokenStore::new(dir.path().join("credentials.json"), TokenKind::Access),
            TokenStore::new(dir.path().join("app_credentials.json"), TokenKind::App),
        ];
        for store in &stores {
            store.save(Some(&SecretString::from("t"))).unwrap();
        }

        logout(&stores).unwrap();

        assert!(stores.iter().all(|s| s.load().is_none() && s.path().exists()));
    }
}
