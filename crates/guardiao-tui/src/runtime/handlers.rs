//! Effect handlers for the TUI runtime.
//!
//! Handlers are pure async functions that return `UiEvent`. The runtime
//! spawns them with `spawn_effect` and the result lands in the inbox.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use guardiao_core::config::Config;
use guardiao_core::content::Persona;
use guardiao_core::gate::GateEffect;
use guardiao_core::session::{self, SessionStore};
use tracing::{debug, warn};

use crate::events::UiEvent;

/// Runs a gate-requested store call and reports which flow it finished.
pub async fn session_call(
    store: Arc<dyn SessionStore>,
    effect: GateEffect,
    timeout: Duration,
) -> UiEvent {
    let result = session::execute(store.as_ref(), &effect, timeout).await;
    match effect {
        GateEffect::SignOut => UiEvent::SignOutFinished(result),
        GateEffect::SignIn { .. } | GateEffect::SignUp { .. } => UiEvent::SubmitFinished(result),
    }
}

/// Writes the persona preference. Failures are logged; the selection already
/// applies for this run.
pub fn persist_persona(config_path: &Path, persona: Persona) {
    match Config::save_default_persona_to(config_path, persona) {
        Ok(()) => debug!(persona = persona.as_str(), "persona saved"),
        Err(err) => warn!(error = %format!("{err:#}"), "failed to save persona"),
    }
}
