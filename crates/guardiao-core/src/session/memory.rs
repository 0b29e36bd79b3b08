//! In-process session store.
//!
//! Accounts live in memory for the lifetime of the process. Used for
//! `--offline` runs and as a collaborator in tests. Failure codes match the
//! hosted provider's for the cases it can detect locally.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::info;

use super::{AuthError, Session, SessionHub, SessionStore, Subscription};

/// Minimum password length accepted on sign-up.
const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    user_id: String,
    password: String,
}

#[derive(Default)]
pub struct MemorySessionStore {
    accounts: Mutex<HashMap<String, Account>>,
    hub: SessionHub,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account up front (demo data, test fixtures).
    #[must_use]
    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                email.to_string(),
                Account {
                    user_id: uuid::Uuid::new_v4().to_string(),
                    password: password.to_string(),
                },
            );
        self
    }

    /// Publishes the initial state: nobody is signed in.
    pub fn restore(&self) {
        self.hub.publish(None);
    }

    fn sign_in_now(&self, email: &str, password: &str) -> Result<(), AuthError> {
        if !looks_like_email(email) {
            return Err(AuthError::rejected("invalid-email"));
        }
        let user_id = {
            let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
            let account = accounts
                .get(email)
                .ok_or_else(|| AuthError::rejected("user-not-found"))?;
            if account.password != password {
                return Err(AuthError::rejected("wrong-password"));
            }
            account.user_id.clone()
        };
        info!("memory store: signed in");
        self.hub.publish(Some(Session {
            user_id,
            email: email.to_string(),
        }));
        Ok(())
    }

    fn sign_up_now(&self, email: &str, password: &str) -> Result<(), AuthError> {
        if !looks_like_email(email) {
            return Err(AuthError::rejected("invalid-email"));
        }
        let user_id = {
            let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
            if accounts.contains_key(email) {
                return Err(AuthError::rejected("email-already-in-use"));
            }
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(AuthError::rejected("weak-password"));
            }
            let user_id = uuid::Uuid::new_v4().to_string();
            accounts.insert(
                email.to_string(),
                Account {
                    user_id: user_id.clone(),
                    password: password.to_string(),
                },
            );
            user_id
        };
        info!("memory store: account created");
        self.hub.publish(Some(Session {
            user_id,
            email: email.to_string(),
        }));
        Ok(())
    }
}

impl SessionStore for MemorySessionStore {
    fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    fn sign_in<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<(), AuthError>> {
        async move { self.sign_in_now(email, password) }.boxed()
    }

    fn sign_up<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<(), AuthError>> {
        async move { self.sign_up_now(email, password) }.boxed()
    }

    fn sign_out(&self) -> BoxFuture<'_, Result<(), AuthError>> {
        async move {
            self.hub.publish(None);
            Ok(())
        }
        .boxed()
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
}
