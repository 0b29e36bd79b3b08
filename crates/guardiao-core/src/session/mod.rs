//! Session store contract.
//!
//! A session store verifies credentials, owns the signed-in identity and
//! notifies subscribers of every change to it. Two implementations live
//! here: [`IdentityToolkitStore`] talks to the hosted identity provider and
//! persists the session on disk, [`MemorySessionStore`] keeps accounts in
//! process for offline runs and tests.

mod hub;
mod identity_toolkit;
mod memory;
mod persist;

use std::time::Duration;

use futures_util::future::BoxFuture;
pub use hub::{SessionHub, Subscription};
pub use identity_toolkit::IdentityToolkitStore;
pub use memory::MemorySessionStore;
pub use persist::{SessionFile, StoredSession};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::gate::GateEffect;

/// Authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque user identifier assigned by the store.
    pub user_id: String,
    /// Email-like label for display.
    pub email: String,
}

/// A session notification: `None` means signed out.
pub type SessionChange = Option<Session>;

/// Failure reported by a session store call.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider refused the request with a failure code.
    #[error("identity provider rejected the request ({code})")]
    Rejected { code: String },
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("identity provider did not answer within {0:?}")]
    Timeout(Duration),
    #[error("failed to persist session: {0}")]
    Persistence(String),
}

impl AuthError {
    pub fn rejected(code: impl Into<String>) -> Self {
        AuthError::Rejected { code: code.into() }
    }

    /// Failure code used for the user-facing message lookup.
    pub fn code(&self) -> &str {
        match self {
            AuthError::Rejected { code } => code,
            AuthError::Transport(_) => "network-request-failed",
            AuthError::Timeout(_) => "timeout",
            AuthError::Persistence(_) => "internal-error",
        }
    }
}

/// External identity service consumed by the gate.
///
/// Calls complete independently of the notifications they cause: a
/// successful `sign_in` returns and, separately, every subscriber receives
/// the new session.
pub trait SessionStore: Send + Sync {
    /// Registers a subscriber. The current state is delivered first if the
    /// store already knows it, then every later transition in order.
    /// Dropping the returned handle unsubscribes.
    fn subscribe(&self) -> Subscription;

    fn sign_in<'a>(&'a self, email: &'a str, password: &'a str)
    -> BoxFuture<'a, Result<(), AuthError>>;

    fn sign_up<'a>(&'a self, email: &'a str, password: &'a str)
    -> BoxFuture<'a, Result<(), AuthError>>;

    fn sign_out(&self) -> BoxFuture<'_, Result<(), AuthError>>;
}

/// Runs a gate-requested store call, giving up after `timeout`.
///
/// A call that outlives the timeout resolves to [`AuthError::Timeout`]; the
/// gate then shows the generic failure message and accepts new submits.
pub async fn execute(
    store: &dyn SessionStore,
    effect: &GateEffect,
    timeout: Duration,
) -> Result<(), AuthError> {
    let call = match effect {
        GateEffect::SignIn { email, password } => store.sign_in(email, password),
        GateEffect::SignUp { email, password } => store.sign_up(email, password),
        GateEffect::SignOut => store.sign_out(),
    };
    tokio::time::timeout(timeout, call).await.unwrap_or_else(|_| {
        warn!(?effect, ?timeout, "session store call timed out");
        Err(AuthError::Timeout(timeout))
    })
}

#[cfg(test)]
mod tests {
    use futures_util::FutureExt;

    use super::*;

    /// Store whose calls never complete.
    struct StalledStore {
        hub: SessionHub,
    }

    impl SessionStore for StalledStore {
        fn subscribe(&self) -> Subscription {
            self.hub.subscribe()
        }

        fn sign_in<'a>(&'a self, _: &'a str, _: &'a str) -> BoxFuture<'a, Result<(), AuthError>> {
            futures_util::future::pending().boxed()
        }

        fn sign_up<'a>(&'a self, _: &'a str, _: &'a str) -> BoxFuture<'a, Result<(), AuthError>> {
            futures_util::future::pending().boxed()
        }

        fn sign_out(&self) -> BoxFuture<'_, Result<(), AuthError>> {
            futures_util::future::pending().boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_times_out() {
        let store = StalledStore {
            hub: SessionHub::new(),
        };
        let effect = GateEffect::SignIn {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        };
        let err = execute(&store, &effect, Duration::from_secs(15))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "timeout");
    }

    #[tokio::test]
    async fn test_execute_dispatches_by_effect() {
        let store = MemorySessionStore::new().with_account("a@b.com", "secret1");
        let mut sub = store.subscribe();
        let timeout = Duration::from_secs(1);

        let sign_up = GateEffect::SignUp {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        };
        let err = execute(&store, &sign_up, timeout).await.unwrap_err();
        assert_eq!(err.code(), "email-already-in-use");

        let sign_in = GateEffect::SignIn {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        };
        execute(&store, &sign_in, timeout).await.unwrap();
        assert!(sub.try_recv().unwrap().is_some());

        execute(&store, &GateEffect::SignOut, timeout).await.unwrap();
        assert_eq!(sub.try_recv(), Some(None));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::rejected("weak-password").code(), "weak-password");
        assert_eq!(AuthError::Timeout(Duration::from_secs(1)).code(), "timeout");
        assert_eq!(
            AuthError::Persistence("disk full".to_string()).code(),
            "internal-error"
        );
    }
}
