// SPDX-License-Identifier: Apache-2.0

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use eadconnect_core::{
    Credentials, EducationClient, MessageId, Notifier, NotifyError, TokenKind,
};
use secrecy::SecretString;
use wiremock::MockServer;

/// Client pointed at the mock server, without tokens.
pub fn client_for(server: &MockServer) -> EducationClient {
    let credentials = Credentials::new("student", SecretString::from("pw"), "FAESA");
    EducationClient::with_base_url(credentials, &server.uri(), 5).expect("client")
}

/// Client holding the academic token `academic`.
pub fn authed_client(server: &MockServer) -> EducationClient {
    let mut client = client_for(server);
    client.set_token(TokenKind::Access, Some(SecretString::from("academic")));
    client
}

/// Notifier that records every call.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<MessageId>>,
    pub closed: AtomicBool,
    /// Delay applied inside `send`.
    pub send_delay: Duration,
    /// File whose presence is sampled at every send.
    pub watch: Option<PathBuf>,
    pub watched_existed: AtomicBool,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub next_id: AtomicI64,
    /// Sends whose text contains one of these fragments fail.
    pub fail_matching: Vec<String>,
    pub failed: AtomicUsize,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<MessageId> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<MessageId, NotifyError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
        if let Some(path) = &self.watch
            && path.exists()
        {
            self.watched_existed.store(true, Ordering::SeqCst);
        }
        if self.fail_matching.iter().any(|f| text.contains(f.as_str())) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.failed.fetch_add(1, Ordering::SeqCst);
            return Err(NotifyError::Telegram {
                description: "Bad Request: chat not found".to_string(),
            });
        }
        self.sent.lock().unwrap().push(text.to_string());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn delete(&self, id: MessageId) -> Result<(), NotifyError> {
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }

    async fn close(&self) -> Result<(), NotifyError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
