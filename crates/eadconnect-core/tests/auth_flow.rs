// SPDX-License-Identifier: Apache-2.0

//! Authenticator behaviour against a mock platform.

mod common;

use std::time::Duration;

use eadconnect_core::{
    AuthError, AuthPolicy, Credentials, EducationClient, TokenKind, TokenStore, authenticate,
    is_token_valid,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SIGNIN: &str = "/v2/safea-client/auth/signin/tenants/faesa";
const ASSUME: &str = "/v2/safea-client/auth/role/assume";
const ME: &str = "/v2/safea-client/users/me";

fn policy(max_attempts: u32) -> AuthPolicy {
    AuthPolicy {
        max_attempts,
        backoff: Duration::ZERO,
        auto_save: true,
    }
}

async fn mount_me(server: &MockServer, token: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(ME))
        .and(header("Authorization", token))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({"user": {"name": "Ana"}})),
        )
        .mount(server)
        .await;
}

async fn mount_login(server: &MockServer, signin_token: &str, final_token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(SIGNIN))
        .and(body_partial_json(json!({
            "username": "student",
            "password": "pw",
            "applicationAlias": "plataforma",
            "iesAlias": "107_1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": signin_token})))
        .expect(times)
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path(ASSUME))
        .and(header("Authorization", signin_token))
        .and(body_partial_json(json!({"roleAlias": "student", "tenantAlias": "faesa"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": final_token})))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn valid_stored_token_skips_login() {
    let server = MockServer::start().await;
    mount_me(&server, "stored", 200).await;
    mount_login(&server, "signin", "fresh", 0).await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("credentials.json"), TokenKind::Access);
    store.save(Some(&SecretString::from("stored"))).unwrap();

    let mut client = common::client_for(&server);
    let token = authenticate(&mut client, &store, &policy(3)).await.unwrap();

    assert_eq!(token.expose_secret(), "stored");
    assert_eq!(
        client.token(TokenKind::Access).unwrap().expose_secret(),
        "stored"
    );
}

#[tokio::test]
async fn invalid_stored_token_triggers_single_login() {
    let server = MockServer::start().await;
    mount_me(&server, "stale", 401).await;
    mount_me(&server, "fresh", 200).await;
    mount_login(&server, "signin", "fresh", 1).await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("credentials.json"), TokenKind::Access);
    store.save(Some(&SecretString::from("stale"))).unwrap();

    let mut client = common::client_for(&server);
    let token = authenticate(&mut client, &store, &policy(3)).await.unwrap();

    assert_eq!(token.expose_secret(), "fresh");
    assert_eq!(store.load().unwrap().expose_secret(), "fresh");
}

#[tokio::test]
async fn missing_token_file_logs_in() {
    let server = MockServer::start().await;
    mount_me(&server, "fresh", 200).await;
    mount_login(&server, "signin", "fresh", 1).await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("credentials.json"), TokenKind::Access);

    let mut client = common::client_for(&server);
    authenticate(&mut client, &store, &policy(3)).await.unwrap();

    assert_eq!(store.load().unwrap().expose_secret(), "fresh");
}

#[tokio::test]
async fn rejected_tokens_exhaust_attempts() {
    let server = MockServer::start().await;
    mount_me(&server, "bad", 401).await;
    mount_login(&server, "signin", "bad", 3).await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("credentials.json"), TokenKind::Access);

    let mut client = common::client_for(&server);
    let err = authenticate(&mut client, &store, &policy(3)).await.unwrap_err();

    assert!(matches!(err, AuthError::AttemptsExhausted { attempts: 3 }));
    assert!(store.load().is_none());
    assert!(store.path().exists());
    assert!(client.token(TokenKind::Access).is_none());
}

#[tokio::test]
async fn signin_without_token_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SIGNIN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("credentials.json"), TokenKind::Access);

    let mut client = common::client_for(&server);
    let err = authenticate(&mut client, &store, &policy(3)).await.unwrap_err();

    assert!(matches!(err, AuthError::NoAccessToken(TokenKind::Access)));
}

#[tokio::test]
async fn bad_credentials_fail_fast() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SIGNIN))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("credentials.json"), TokenKind::Access);

    let mut client = common::client_for(&server);
    let err = authenticate(&mut client, &store, &policy(3)).await.unwrap_err();

    match err {
        AuthError::Api(api) => assert_eq!(api.status(), Some(401)),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn server_errors_are_retried_until_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SIGNIN))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("credentials.json"), TokenKind::Access);

    let mut client = common::client_for(&server);
    let err = authenticate(&mut client, &store, &policy(2)).await.unwrap_err();

    assert!(matches!(err, AuthError::AttemptsExhausted { attempts: 2 }));
}

#[tokio::test]
async fn app_token_comes_from_launcher_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/safea-client/auth/sso/applications/academic-services/url"))
        .and(header("Authorization", "academic"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"url": "https://portal.example/launch?token=app-1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/academic-services/bff/my-informations"))
        .and(header("Authorization", "app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"registration": "42"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("app_credentials.json"), TokenKind::App);

    let mut client = common::authed_client(&server);
    let token = authenticate(&mut client, &store, &policy(3)).await.unwrap();

    assert_eq!(token.expose_secret(), "app-1");
    assert_eq!(client.token(TokenKind::App).unwrap().expose_secret(), "app-1");
    assert_eq!(
        client.token(TokenKind::Access).unwrap().expose_secret(),
        "academic"
    );
}

#[tokio::test]
async fn unreachable_validation_counts_as_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ME))
        .and(header("Authorization", "stored"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    mount_me(&server, "fresh", 200).await;
    mount_login(&server, "signin", "fresh", 1).await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("credentials.json"), TokenKind::Access);
    store.save(Some(&SecretString::from("stored"))).unwrap();

    let credentials = Credentials::new("student", SecretString::from("pw"), "FAESA");
    let mut client = EducationClient::with_base_url(credentials, &server.uri(), 1).unwrap();
    let token = authenticate(&mut client, &store, &policy(3)).await.unwrap();

    assert_eq!(token.expose_secret(), "fresh");
    assert_eq!(store.load().unwrap().expose_secret(), "fresh");
}

#[tokio::test]
async fn connection_refused_is_an_invalid_token() {
    let credentials = Credentials::new("student", SecretString::from("pw"), "FAESA");
    let client = EducationClient::with_base_url(credentials, "http://127.0.0.1:9", 1).unwrap();

    assert!(!is_token_valid(&client, TokenKind::Access, &SecretString::from("any")).await);
}
