//! End-to-end session lifecycle against a mocked backend: login into the
//! pending-two-factor state, survive a process restart via the file-backed
//! store, verify the OTP, pass the guard, and log out.

use anyhow::{Result, anyhow};
use base64ct::{Base64UrlUnpadded, Encoding};
use empdesk::{
    AppConfig, Error, GuardVerdict, LoginOutcome, PostLoginRoute, Session, SessionClient,
    SessionState,
};
use empdesk::{CredentialStore, FileCredentialStore};
use secrecy::SecretString;
use serde_json::json;
use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NOW: i64 = 1_700_000_000;

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn make_token(claims: &serde_json::Value) -> String {
    let header = Base64UrlUnpadded::encode_string(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = Base64UrlUnpadded::encode_string(claims.to_string().as_bytes());
    format!("{header}.{payload}.signature")
}

fn config_for(server: &MockServer, session_file: &Path) -> AppConfig {
    AppConfig {
        api_base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
        session_file: session_file.to_path_buf(),
    }
}

fn open_client(config: &AppConfig) -> Result<(SessionClient, Arc<FileCredentialStore>)> {
    let store = Arc::new(FileCredentialStore::open(&config.session_file)?);
    let client = SessionClient::new(config, store.clone())?;
    Ok((client, store))
}

#[tokio::test]
async fn two_factor_login_survives_a_restart_and_passes_the_guard() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir()?;
    let config = config_for(&server, &dir.path().join("session.json"));

    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .and(body_json(json!({
            "adminName": "asha",
            "adminPassword": "pw"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "twoFactorRequired": true,
            "preAuthToken": "p1",
            "message": "2FA required"
        })))
        .mount(&server)
        .await;

    let final_token = make_token(&json!({"sub": "asha", "role": "ADMIN", "exp": NOW + 3600}));
    Mock::given(method("POST"))
        .and(path("/2fa/verify"))
        .and(body_json(json!({
            "preAuthToken": "p1",
            "code": "123456"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": final_token,
            "username": "asha",
            "role": "ADMIN"
        })))
        .mount(&server)
        .await;

    // First process: submit credentials and land in the pending state.
    {
        let (client, _store) = open_client(&config)?;
        let outcome = client
            .login("asha", &SecretString::from("pw".to_string()))
            .await?;
        assert_eq!(outcome, LoginOutcome::TwoFactorRequired);
        assert_eq!(client.state(), SessionState::PendingTwoFactor);
        assert!(!client.guard().check_at(NOW).is_allowed());
    }

    // Second process: the pending challenge was persisted, so the OTP can
    // be verified without logging in again.
    let (client, store) = open_client(&config)?;
    assert_eq!(client.state(), SessionState::PendingTwoFactor);

    client.verify_otp("123456").await?;
    let session = store.load();
    assert_eq!(session.state(), SessionState::Authenticated);
    assert_eq!(session.pre_auth_token(), None);
    assert_eq!(session.username(), Some("asha"));

    assert_eq!(client.guard().check_at(NOW), GuardVerdict::Allow);

    client.logout();
    assert_eq!(store.load(), Session::Empty);
    assert!(!client.guard().check_at(NOW).is_allowed());

    // Third process: logout was durable.
    let reopened = FileCredentialStore::open(&config.session_file)?;
    assert_eq!(reopened.load(), Session::Empty);
    Ok(())
}

#[tokio::test]
async fn direct_login_without_a_factor_routes_to_enrollment() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir()?;
    let config = config_for(&server, &dir.path().join("session.json"));

    let token = make_token(&json!({"sub": "asha", "exp": NOW + 3600}));
    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": token,
            "role": "ADMIN",
            "username": "asha"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "asha",
            "role": "ADMIN",
            "twoFactorEnabled": false
        })))
        .mount(&server)
        .await;

    let (client, _store) = open_client(&config)?;
    let outcome = client
        .login("asha", &SecretString::from("pw".to_string()))
        .await?;
    let LoginOutcome::Authenticated { two_factor_enabled } = outcome else {
        return Err(anyhow!("expected a direct login"));
    };
    assert_eq!(two_factor_enabled, None);

    let route = client.post_login_route(two_factor_enabled).await;
    assert_eq!(route, PostLoginRoute::EnrollTwoFactor);
    assert_eq!(client.state(), SessionState::Authenticated);
    Ok(())
}

#[tokio::test]
async fn an_expired_persisted_token_is_cleared_on_the_first_guard_check() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir()?;
    let config = config_for(&server, &dir.path().join("session.json"));

    let expired = make_token(&json!({"sub": "asha", "exp": NOW - 1}));
    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": expired})))
        .mount(&server)
        .await;

    {
        let (client, _store) = open_client(&config)?;
        client
            .login("asha", &SecretString::from("pw".to_string()))
            .await?;
    }

    let (client, store) = open_client(&config)?;
    assert_eq!(client.state(), SessionState::Authenticated);
    assert!(!client.guard().check_at(NOW).is_allowed());
    assert_eq!(store.load(), Session::Empty);

    // The clear is durable: a fresh open starts unauthenticated.
    let reopened = FileCredentialStore::open(&config.session_file)?;
    assert_eq!(reopened.load(), Session::Empty);
    Ok(())
}

#[tokio::test]
async fn login_failure_leaves_the_machine_where_it_was() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir()?;
    let config = config_for(&server, &dir.path().join("session.json"));

    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "error",
            "message": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let (client, store) = open_client(&config)?;
    let err = client
        .login("asha", &SecretString::from("wrong".to_string()))
        .await
        .err()
        .ok_or_else(|| anyhow!("expected error"))?;
    assert!(matches!(err, Error::Rejected(_)));
    assert_eq!(store.load(), Session::Empty);
    assert_eq!(client.state(), SessionState::Unauthenticated);
    Ok(())
}
