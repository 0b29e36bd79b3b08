//! Hosted email/password identity provider.
//!
//! Speaks the Identity Toolkit REST API (`accounts:signInWithPassword`,
//! `accounts:signUp`) and persists the resulting session so it survives
//! restarts. Sign-out is local: the persisted session is dropped.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::Deserialize;
use tracing::{info, warn};

use super::{AuthError, SessionFile, SessionHub, SessionStore, StoredSession, Subscription};
use crate::config::Config;

/// Token lifetime assumed when the provider omits `expiresIn`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

pub struct IdentityToolkitStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    session_file: SessionFile,
    hub: SessionHub,
}

impl IdentityToolkitStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        session_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            session_file: SessionFile::new(session_path),
            hub: SessionHub::new(),
        }
    }

    /// Builds the store from configuration.
    ///
    /// # Errors
    /// Fails if no API key is configured.
    pub fn from_config(config: &Config, session_path: impl Into<PathBuf>) -> Result<Self> {
        let Some(api_key) = config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            anyhow::bail!(
                "No identity provider API key configured.\n\
                 Set GUARDIAO_API_KEY or `api_key` in the config file, or run with --offline."
            );
        };
        let base_url = url::Url::parse(&config.auth_base_url).with_context(|| {
            format!("Invalid auth_base_url '{}'", config.auth_base_url)
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!(
                "auth_base_url must be an http(s) URL, got '{}'",
                config.auth_base_url
            );
        }
        Ok(Self::new(&config.auth_base_url, api_key, session_path))
    }

    /// Publishes the persisted session (or its absence) as the initial state.
    pub fn restore(&self) {
        let stored = self.session_file.load_or_discard();
        info!(restored = stored.is_some(), "identity: initial session");
        self.hub.publish(stored.as_ref().map(StoredSession::session));
    }

    /// Returns the persisted session without touching subscribers.
    pub fn stored_session(&self) -> Option<StoredSession> {
        self.session_file.load_or_discard()
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/accounts:{action}", self.base_url.trim_end_matches('/'))
    }

    async fn authenticate(&self, action: &str, email: &str, password: &str) -> Result<(), AuthError> {
        info!(action, "identity: request");
        let response = self
            .http
            .post(self.endpoint(action))
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let code = serde_json::from_str::<ErrorEnvelope>(&body)
                .map_or_else(|_| format!("http-{}", status.as_u16()), |env| {
                    provider_code(&env.error.message)
                });
            warn!(action, %status, code, "identity: rejected");
            return Err(AuthError::Rejected { code });
        }

        let token: TokenResponse = response.json().await?;
        let now = Utc::now();
        let expires_in = token
            .expires_in
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let stored = StoredSession {
            user_id: token.local_id,
            email: token.email.unwrap_or_else(|| email.to_string()),
            id_token: token.id_token,
            refresh_token: token.refresh_token.unwrap_or_default(),
            expires_at: now + ChronoDuration::seconds(expires_in),
            signed_in_at: now,
        };

        self.session_file
            .save(&stored)
            .map_err(|err| AuthError::Persistence(format!("{err:#}")))?;
        info!(action, "identity: signed in");
        self.hub.publish(Some(stored.session()));
        Ok(())
    }
}

impl SessionStore for IdentityToolkitStore {
    fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    fn sign_in<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<(), AuthError>> {
        self.authenticate("signInWithPassword", email, password)
            .boxed()
    }

    fn sign_up<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<(), AuthError>> {
        self.authenticate("signUp", email, password).boxed()
    }

    fn sign_out(&self) -> BoxFuture<'_, Result<(), AuthError>> {
        async move {
            self.session_file
                .clear()
                .map_err(|err| AuthError::Persistence(format!("{err:#}")))?;
            info!("identity: signed out");
            self.hub.publish(None);
            Ok(())
        }
        .boxed()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: Option<String>,
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps a provider error message (`"WEAK_PASSWORD : detail"`) to a client
/// failure code.
fn provider_code(message: &str) -> String {
    let raw = message
        .split([' ', ':'])
        .find(|part| !part.is_empty())
        .unwrap_or_default();
    match raw {
        "EMAIL_EXISTS" => "email-already-in-use".to_string(),
        "INVALID_EMAIL" => "invalid-email".to_string(),
        "EMAIL_NOT_FOUND" => "user-not-found".to_string(),
        "INVALID_PASSWORD" => "wrong-password".to_string(),
        "WEAK_PASSWORD" => "weak-password".to_string(),
        "INVALID_LOGIN_CREDENTIALS" => "invalid-credential".to_string(),
        "USER_DISABLED" => "user-disabled".to_string(),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "too-many-requests".to_string(),
        "MISSING_PASSWORD" => "missing-password".to_string(),
        other => other.to_ascii_lowercase().replace('_', "-"),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::{TempDir, tempdir};
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn store_for(server: &MockServer, dir: &TempDir) -> IdentityToolkitStore {
        IdentityToolkitStore::new(server.uri(), "test-key", dir.path().join("session.json"))
    }

    fn error_body(message: &str) -> serde_json::Value {
        serde_json::json!({ "error": { "code": 400, "message": message } })
    }

    #[test]
    fn test_provider_code_mapping() {
        assert_eq!(provider_code("EMAIL_EXISTS"), "email-already-in-use");
        assert_eq!(provider_code("INVALID_PASSWORD"), "wrong-password");
        assert_eq!(
            provider_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            "weak-password"
        );
        assert_eq!(provider_code("OPERATION_NOT_ALLOWED"), "operation-not-allowed");
        assert_eq!(provider_code(""), "");
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let dir = tempdir().unwrap();
        let config = Config::default();
        assert!(IdentityToolkitStore::from_config(&config, dir.path().join("s.json")).is_err());

        let config = Config {
            api_key: Some("k".to_string()),
            ..Config::default()
        };
        assert!(IdentityToolkitStore::from_config(&config, dir.path().join("s.json")).is_ok());

        let config = Config {
            api_key: Some("k".to_string()),
            auth_base_url: "ftp://example.com".to_string(),
            ..Config::default()
        };
        assert!(IdentityToolkitStore::from_config(&config, dir.path().join("s.json")).is_err());
    }

    #[tokio::test]
    async fn test_sign_in_persists_and_notifies() {
        let server = MockServer::start().await;
        let dir = tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/accounts:signInWithPassword"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "email": "a@b.com",
                "password": "secret1",
                "returnSecureToken": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "localId": "uid-42",
                "email": "a@b.com",
                "idToken": "id-token",
                "refreshToken": "refresh-token",
                "expiresIn": "3600",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server, &dir);
        store.restore();
        let mut sub = store.subscribe();
        assert_eq!(sub.try_recv(), Some(None));

        store.sign_in("a@b.com", "secret1").await.unwrap();

        let session = sub.try_recv().unwrap().unwrap();
        assert_eq!(session.user_id, "uid-42");
        assert_eq!(session.email, "a@b.com");

        let stored = store.stored_session().unwrap();
        assert_eq!(stored.id_token, "id-token");
        assert!(stored.expires_at > stored.signed_in_at);
    }

    #[tokio::test]
    async fn test_rejection_maps_code_and_keeps_session_absent() {
        let server = MockServer::start().await;
        let dir = tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/accounts:signUp"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body(
                "WEAK_PASSWORD : Password should be at least 6 characters",
            )))
            .mount(&server)
            .await;

        let store = store_for(&server, &dir);
        store.restore();
        let mut sub = store.subscribe();
        let _ = sub.try_recv();

        let err = store.sign_up("a@b.com", "123").await.unwrap_err();
        assert_eq!(err.code(), "weak-password");
        assert_eq!(sub.try_recv(), None);
        assert!(store.stored_session().is_none());
    }

    #[tokio::test]
    async fn test_unparseable_error_body_uses_status_code() {
        let server = MockServer::start().await;
        let dir = tempdir().unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let store = store_for(&server, &dir);
        let err = store.sign_in("a@b.com", "secret1").await.unwrap_err();
        assert_eq!(err.code(), "http-503");
    }

    #[tokio::test]
    async fn test_restore_after_restart_and_sign_out() {
        let server = MockServer::start().await;
        let dir = tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/accounts:signInWithPassword"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "localId": "uid-7",
                "idToken": "id-token",
            })))
            .mount(&server)
            .await;

        store_for(&server, &dir)
            .sign_in("kid@school.com", "secret1")
            .await
            .unwrap();

        // A fresh store over the same file sees the persisted session.
        let restarted = store_for(&server, &dir);
        let mut sub = restarted.subscribe();
        restarted.restore();
        let session = sub.try_recv().unwrap().unwrap();
        assert_eq!(session.email, "kid@school.com");

        restarted.sign_out().await.unwrap();
        assert_eq!(sub.try_recv(), Some(None));
        assert!(restarted.stored_session().is_none());
    }
}
