// SPDX-License-Identifier: Apache-2.0

//! Session commands: login, logout and status.

use anyhow::Result;
use eadconnect_core::{
    AppConfig, Credentials, EducationClient, TokenKind, TokenStore, is_token_valid, logout,
};
use secrecy::SecretString;
use tracing::{debug, info, instrument};

use super::types::AuthStatusResult;
use crate::session;

fn stored(kind: TokenKind) -> bool {
    TokenStore::for_kind(kind).load().is_some()
}

/// Logs in (reusing a valid stored token) and returns the profile.
#[instrument(skip_all)]
pub async fn run_login(config: &AppConfig) -> Result<AuthStatusResult> {
    let client = session::academic_client(config).await?;
    let profile = client.get_me().await?;
    info!("Logged in");

    Ok(AuthStatusResult {
        authenticated: true,
        institution: client.institution().to_string(),
        username: Some(client.credentials().username.clone()),
        name: profile.user.name,
        email: profile.user.email,
        access_token_stored: stored(TokenKind::Access),
        app_token_stored: stored(TokenKind::App),
    })
}

/// Clears both stored tokens.
pub fn run_logout() -> Result<()> {
    logout(&TokenStore::defaults())?;
    Ok(())
}

/// Validates the stored academic token without logging in.
#[instrument(skip_all)]
pub async fn run_status(config: &AppConfig) -> Result<AuthStatusResult> {
    let mut result = AuthStatusResult {
        authenticated: false,
        institution: config.auth.institution.clone(),
        username: config.auth.username.clone(),
        name: None,
        email: None,
        access_token_stored: stored(TokenKind::Access),
        app_token_stored: stored(TokenKind::App),
    };

    let Some(token) = TokenStore::for_kind(TokenKind::Access).load() else {
        debug!("No stored academic token");
        return Ok(result);
    };

    // Probing a token needs no password; status never prompts.
    let credentials = Credentials::new(
        config.auth.username.clone().unwrap_or_default(),
        SecretString::from(String::new()),
        &config.auth.institution,
    );
    let mut client = EducationClient::from_config(credentials, config)?;

    if is_token_valid(&client, TokenKind::Access, &token).await {
        client.set_token(TokenKind::Access, Some(token));
        result.authenticated = true;
        if let Ok(profile) = client.get_me().await {
            result.name = profile.user.name;
            result.email = profile.user.email;
        }
    }

    Ok(result)
}
