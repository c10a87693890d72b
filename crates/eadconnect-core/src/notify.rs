// SPDX-License-Identifier: Apache-2.0

//! Notification delivery.
//!
//! The monitor talks to a [`Notifier`]; the production implementation posts
//! to the Telegram Bot API and [`LogNotifier`] writes to the log when no bot
//! is configured.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::config::TelegramConfig;
use crate::error::NotifyError;

/// Identifier of a delivered message, used to delete it later.
pub type MessageId = i64;

/// Outbound notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers a Markdown message.
    async fn send(&self, text: &str) -> Result<MessageId, NotifyError>;

    /// Deletes a previously delivered message.
    async fn delete(&self, id: MessageId) -> Result<(), NotifyError>;

    /// Releases the channel. Default: nothing to release.
    async fn close(&self) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Bot API envelope.
#[derive(Debug, Deserialize)]
struct BotResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: MessageId,
}

/// Telegram Bot API notifier.
#[derive(Debug)]
pub struct TelegramNotifier {
    http: Client,
    api_base: String,
    bot_token: SecretString,
    chat_id: String,
}

impl TelegramNotifier {
    /// Creates a notifier for one chat.
    pub fn new(
        api_base: &str,
        bot_token: SecretString,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token,
            chat_id: chat_id.into(),
        })
    }

    /// Creates a notifier from config.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::NotConfigured` if the bot token or chat id is
    /// missing.
    pub fn from_config(config: &TelegramConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let bot_token = config
            .bot_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(NotifyError::NotConfigured("monitor.telegram.bot_token"))?;
        let chat_id = config
            .chat_id
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or(NotifyError::NotConfigured("monitor.telegram.chat_id"))?;
        Self::new(&config.api_base_url, SecretString::from(bot_token), chat_id, timeout)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token.expose_secret())
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<Option<T>, NotifyError> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let body: BotResponse<T> = response.json().await?;

        if !body.ok {
            return Err(NotifyError::Telegram {
                description: body
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            });
        }
        Ok(body.result)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip_all)]
    async fn send(&self, text: &str) -> Result<MessageId, NotifyError> {
        let sent: Option<SentMessage> = self
            .call(
                "sendMessage",
                json!({
                    "chat_id": self.chat_id,
                    "text": text,
                    "parse_mode": "Markdown",
                }),
            )
            .await?;
        let id = sent.map(|m| m.message_id).ok_or_else(|| NotifyError::Telegram {
            description: "sendMessage returned no message".to_string(),
        })?;
        debug!(message_id = id, "Telegram message sent");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: MessageId) -> Result<(), NotifyError> {
        let _: Option<bool> = self
            .call(
                "deleteMessage",
                json!({
                    "chat_id": self.chat_id,
                    "message_id": id,
                }),
            )
            .await?;
        Ok(())
    }
}

/// Notifier that only logs; used when Telegram is not configured.
#[derive(Debug, Default)]
pub struct LogNotifier {
    next_id: AtomicI64,
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<MessageId, NotifyError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        info!(message_id = id, "{text}");
        Ok(id)
    }

    async fn delete(&self, id: MessageId) -> Result<(), NotifyError> {
        debug!(message_id = id, "Discarding logged notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_token_and_chat() {
        let config = TelegramConfig::default();
        let err = TelegramNotifier::from_config(&config, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured("monitor.telegram.bot_token")));

        let config = TelegramConfig {
            bot_token: Some("123:abc".to_string()),
            ..TelegramConfig::default()
        };
        let err = TelegramNotifier::from_config(&config, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured("monitor.telegram.chat_id")));
    }

    #[test]
    fn test_method_url() {
        let notifier = TelegramNotifier::new(
            "https://api.telegram.org/",
            SecretString::from("123:abc"),
            "42",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            notifier.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[tokio::test]
    async fn test_log_notifier_issues_increasing_ids() {
        let notifier = LogNotifier::default();
        let first = notifier.send("a").await.unwrap();
        let second = notifier.send("b").await.unwrap();
        assert!(second > first);
        notifier.delete(first).await.unwrap();
        notifier.close().await.unwrap();
    }
}
