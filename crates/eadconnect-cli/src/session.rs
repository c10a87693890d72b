// SPDX-License-Identifier: Apache-2.0

//! Authenticated client construction for CLI commands.
//!
//! Credentials come from the config layers (file, then `EADCONNECT_AUTH__*`
//! variables). When they are missing and stdin is a terminal the user is
//! prompted and the answers are written back to the config file.

use std::borrow::Cow;
use std::io::IsTerminal;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Password};
use eadconnect_core::{
    AppConfig, AuthConfig, AuthError, AuthPolicy, Credentials, EducationClient, TokenKind,
    TokenStore, authenticate, save_credentials,
};
use secrecy::SecretString;
use tracing::{debug, info};

/// First credential field the config does not provide.
fn missing_field(auth: &AuthConfig) -> Option<&'static str> {
    let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());
    if blank(&auth.username) {
        Some("auth.username")
    } else if blank(&auth.password) {
        Some("auth.password")
    } else {
        None
    }
}

/// Asks for username, password and institution, then saves them.
fn prompt_credentials(auth: &AuthConfig) -> Result<AuthConfig> {
    println!(
        "{} No credentials configured. They will be saved to {}",
        style("!").yellow().bold(),
        eadconnect_core::config_file_path().display()
    );

    let username: String = Input::new()
        .with_prompt("Username")
        .with_initial_text(auth.username.clone().unwrap_or_default())
        .interact_text()
        .context("Failed to read username")?;
    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .context("Failed to read password")?;
    let institution: String = Input::new()
        .with_prompt("Institution")
        .default(auth.institution.clone())
        .interact_text()
        .context("Failed to read institution")?;

    save_credentials(&username, &password, &institution)?;
    info!("Credentials saved");

    Ok(AuthConfig {
        username: Some(username),
        password: Some(password),
        institution,
        ..auth.clone()
    })
}

fn credentials_from(auth: &AuthConfig) -> Credentials {
    Credentials::new(
        auth.username.clone().unwrap_or_default(),
        SecretString::from(auth.password.clone().unwrap_or_default()),
        &auth.institution,
    )
}

/// Credentials from config, prompting when allowed.
pub fn resolve_credentials(auth: &AuthConfig, interactive: bool) -> Result<Credentials> {
    match missing_field(auth) {
        None => Ok(credentials_from(auth)),
        Some(_) if interactive => Ok(credentials_from(&prompt_credentials(auth)?)),
        Some(field) => Err(AuthError::MissingCredentials(field).into()),
    }
}

/// Config with a complete `[auth]` section.
///
/// Prompts run here, before any spinner or progress bar is drawn.
pub fn ensure_credentials(config: &AppConfig, interactive: bool) -> Result<Cow<'_, AppConfig>> {
    match missing_field(&config.auth) {
        None => Ok(Cow::Borrowed(config)),
        Some(_) if interactive => {
            let auth = prompt_credentials(&config.auth)?;
            Ok(Cow::Owned(AppConfig {
                auth,
                ..config.clone()
            }))
        }
        Some(field) => Err(AuthError::MissingCredentials(field).into()),
    }
}

/// Client holding a valid academic token.
pub async fn academic_client(config: &AppConfig) -> Result<EducationClient> {
    let credentials = resolve_credentials(&config.auth, std::io::stdin().is_terminal())?;
    let mut client = EducationClient::from_config(credentials, config)?;

    let store = TokenStore::for_kind(TokenKind::Access);
    authenticate(&mut client, &store, &AuthPolicy::from(&config.auth)).await?;
    debug!(institution = client.institution(), "Academic session ready");

    Ok(client)
}

/// Client holding both the academic and the service-portal app token.
pub async fn financial_client(config: &AppConfig) -> Result<EducationClient> {
    let mut client = academic_client(config).await?;

    let store = TokenStore::for_kind(TokenKind::App);
    authenticate(&mut client, &store, &AuthPolicy::from(&config.auth)).await?;
    debug!("App session ready");

    Ok(client)
}
