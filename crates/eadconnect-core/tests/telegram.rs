// SPDX-License-Identifier: Apache-2.0

//! Telegram Bot API notifier against a mock server.

use std::time::Duration;

use eadconnect_core::{Notifier, NotifyError, TelegramNotifier};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notifier(server: &MockServer) -> TelegramNotifier {
    TelegramNotifier::new(
        &server.uri(),
        SecretString::from("123:abc"),
        "42",
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn send_returns_message_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(json!({
            "chat_id": "42",
            "text": "hello",
            "parse_mode": "Markdown"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true, "result": {"message_id": 7, "text": "hello"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(notifier(&server).send("hello").await.unwrap(), 7);
}

#[tokio::test]
async fn delete_posts_message_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/deleteMessage"))
        .and(body_partial_json(json!({"chat_id": "42", "message_id": 7})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
        .expect(1)
        .mount(&server)
        .await;

    notifier(&server).delete(7).await.unwrap();
}

#[tokio::test]
async fn api_failure_surfaces_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let err = notifier(&server).send("hello").await.unwrap_err();

    match err {
        NotifyError::Telegram { description } => {
            assert_eq!(description, "Bad Request: chat not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}
