//! Headless session commands.
//!
//! `login` and `logout` drive the same gate the interactive screen uses, so
//! validation, failure messages and the wait for the store's notification
//! behave identically.

use std::io::{self, BufRead};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use guardiao_core::config::{Config, paths};
use guardiao_core::gate::{GateState, Mode};
use guardiao_core::session::{
    self, IdentityToolkitStore, SessionFile, SessionStore, Subscription,
};

pub async fn login(config: &Config, email: &str, signup: bool) -> Result<()> {
    let store = IdentityToolkitStore::from_config(config, paths::session_path())?;
    let timeout = config.auth_timeout();

    let mut subscription = store.subscribe();
    store.restore();
    let mut gate = GateState::new(config.default_persona);
    next_change(&mut subscription, &mut gate, timeout).await?;

    if let Some(current) = gate.session() {
        if current.email == email {
            println!("Already signed in as {email}");
            return Ok(());
        }
        bail!("Signed in as {}. Run `guardiao logout` first.", current.email);
    }

    gate.email_input = email.to_string();
    gate.password_input = read_password()?;
    if signup {
        gate.toggle_form_mode();
    }

    let Some(effect) = gate.submit() else {
        bail!("{}", gate.last_error().unwrap_or_default());
    };
    let result = session::execute(&store, &effect, timeout).await;
    gate.on_submit_result(result);
    if let Some(message) = gate.last_error() {
        bail!("{message}");
    }

    while gate.mode() != Mode::Authenticated {
        next_change(&mut subscription, &mut gate, timeout).await?;
    }
    if let Some(current) = gate.session() {
        println!("Signed in as {}", current.email);
    }
    Ok(())
}

pub async fn logout(config: &Config) -> Result<()> {
    // Sign-out is local to the stored session; no API key needed.
    let store = IdentityToolkitStore::new(
        &config.auth_base_url,
        config.api_key.clone().unwrap_or_default(),
        paths::session_path(),
    );
    let timeout = config.auth_timeout();

    let mut subscription = store.subscribe();
    store.restore();
    let mut gate = GateState::new(config.default_persona);
    next_change(&mut subscription, &mut gate, timeout).await?;

    if gate.mode() != Mode::Authenticated {
        println!("Not signed in.");
        return Ok(());
    }

    let effect = gate.sign_out();
    let result = session::execute(&store, &effect, timeout).await;
    gate.on_sign_out_result(result);
    if let Some(message) = gate.last_error() {
        bail!("{message}");
    }

    while gate.mode() == Mode::Authenticated {
        next_change(&mut subscription, &mut gate, timeout).await?;
    }
    println!("Signed out.");
    Ok(())
}

/// Reports the stored session. An unreadable file counts as signed out, as
/// it does for the gate.
pub fn status() -> Result<()> {
    let file = SessionFile::new(paths::session_path());
    match file.load_or_discard() {
        Some(stored) => {
            println!("Signed in as {}", stored.email);
            println!("Since {}", stored.signed_in_at.format("%Y-%m-%d %H:%M UTC"));
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

/// Waits for the next session notification and applies it to the gate.
async fn next_change(
    subscription: &mut Subscription,
    gate: &mut GateState,
    timeout: Duration,
) -> Result<()> {
    let change = tokio::time::timeout(timeout, subscription.recv())
        .await
        .context("Timed out waiting for the session store")?
        .context("Session store stopped sending notifications")?;
    gate.on_session_changed(change);
    Ok(())
}

/// Reads the password from the first line of stdin.
fn read_password() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
