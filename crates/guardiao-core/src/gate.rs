//! Session gate.
//!
//! Decides which screen to show (loading, login/signup form, content) and
//! mediates every session-affecting action. The gate never talks to the
//! session store itself: operations mutate [`GateState`] and return a
//! [`GateEffect`] for the host to execute, and the host feeds the outcome back
//! through [`GateState::on_submit_result`], [`GateState::on_sign_out_result`]
//! and [`GateState::on_session_changed`].
//!
//! Mode transitions are driven only by session notifications. A successful
//! submit clears the form but leaves the mode alone until the store reports
//! the new session.

use std::fmt;

use tracing::{debug, info, warn};

use crate::content::Persona;
use crate::session::{AuthError, Session};

/// Shown when submit is attempted with an empty field.
pub const FILL_IN_MESSAGE: &str = "Fill in email and password.";
/// Shown for any failure code the gate does not know.
pub const GENERIC_FAILURE_MESSAGE: &str = "Authentication failed. Try again.";
/// Shown when the store reports a failed sign-out.
pub const SIGN_OUT_FAILURE_MESSAGE: &str = "Sign-out failed. Try again.";

/// Maps a session store failure code to the message shown under the form.
pub fn failure_message(code: &str) -> &'static str {
    match code {
        "invalid-email" => "Invalid email.",
        "user-not-found" => "User not found.",
        "wrong-password" => "Incorrect password.",
        "email-already-in-use" => "Email already in use.",
        "weak-password" => "Weak password, use at least 6 characters.",
        _ => GENERIC_FAILURE_MESSAGE,
    }
}

/// Which store call the form submits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Login,
    Signup,
}

impl FormMode {
    pub fn toggled(self) -> Self {
        match self {
            FormMode::Login => FormMode::Signup,
            FormMode::Signup => FormMode::Login,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FormMode::Login => "Sign in",
            FormMode::Signup => "Create account",
        }
    }
}

/// Render mode, derived from [`GateState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No session notification received yet.
    Loading,
    /// Notified, no session: show the login/signup form.
    Unauthenticated,
    /// Notified, session present: show content and the sign-out control.
    Authenticated,
}

/// Session store call requested by the gate.
#[derive(Clone, PartialEq, Eq)]
pub enum GateEffect {
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    SignOut,
}

impl fmt::Debug for GateEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateEffect::SignIn { email, .. } => f
                .debug_struct("SignIn")
                .field("email", email)
                .finish_non_exhaustive(),
            GateEffect::SignUp { email, .. } => f
                .debug_struct("SignUp")
                .field("email", email)
                .finish_non_exhaustive(),
            GateEffect::SignOut => f.write_str("SignOut"),
        }
    }
}

/// Gate state.
///
/// `initializing`, `session`, `submitting` and `last_error` are only changed
/// through the methods below; the form inputs and the persona are plain UI
/// fields the host edits directly.
#[derive(Clone, PartialEq, Eq)]
pub struct GateState {
    initializing: bool,
    session: Option<Session>,
    form_mode: FormMode,
    submitting: bool,
    last_error: Option<String>,
    /// Email field contents.
    pub email_input: String,
    /// Password field contents.
    pub password_input: String,
    /// Selected info-card set.
    pub persona: Persona,
}

impl Default for GateState {
    fn default() -> Self {
        Self::new(Persona::default())
    }
}

impl GateState {
    pub fn new(persona: Persona) -> Self {
        Self {
            initializing: true,
            session: None,
            form_mode: FormMode::Login,
            submitting: false,
            last_error: None,
            email_input: String::new(),
            password_input: String::new(),
            persona,
        }
    }

    pub fn mode(&self) -> Mode {
        if self.initializing {
            Mode::Loading
        } else if self.session.is_some() {
            Mode::Authenticated
        } else {
            Mode::Unauthenticated
        }
    }

    pub fn is_initializing(&self) -> bool {
        self.initializing
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn form_mode(&self) -> FormMode {
        self.form_mode
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Applies a session notification from the store.
    ///
    /// The first call leaves `Loading` for good.
    pub fn on_session_changed(&mut self, session: Option<Session>) {
        if self.initializing {
            debug!("gate: first session notification");
        }
        info!(authenticated = session.is_some(), "gate: session changed");
        self.initializing = false;
        self.session = session;
    }

    /// Submits the form.
    ///
    /// Returns the store call to make, or `None` when the attempt is ignored
    /// (a previous submit is still running) or rejected locally (empty field).
    pub fn submit(&mut self) -> Option<GateEffect> {
        if self.submitting {
            debug!("gate: submit ignored, previous attempt still running");
            return None;
        }

        if self.email_input.is_empty() || self.password_input.is_empty() {
            self.last_error = Some(FILL_IN_MESSAGE.to_string());
            return None;
        }

        self.submitting = true;
        self.last_error = None;

        let email = self.email_input.clone();
        let password = self.password_input.clone();
        Some(match self.form_mode {
            FormMode::Login => GateEffect::SignIn { email, password },
            FormMode::Signup => GateEffect::SignUp { email, password },
        })
    }

    /// Applies the outcome of a sign-in or sign-up call.
    pub fn on_submit_result(&mut self, result: Result<(), AuthError>) {
        self.submitting = false;
        match result {
            Ok(()) => {
                self.email_input.clear();
                self.password_input.clear();
            }
            Err(err) => {
                warn!(code = err.code(), error = %err, "gate: submit failed");
                self.last_error = Some(failure_message(err.code()).to_string());
            }
        }
    }

    /// Flips between login and signup. Inputs and error are left as they are.
    pub fn toggle_form_mode(&mut self) {
        self.form_mode = self.form_mode.toggled();
    }

    /// Requests a sign-out. The mode changes only when the store reports it.
    #[allow(clippy::unused_self)]
    pub fn sign_out(&self) -> GateEffect {
        debug!("gate: sign-out requested");
        GateEffect::SignOut
    }

    /// Applies the outcome of a sign-out call.
    pub fn on_sign_out_result(&mut self, result: Result<(), AuthError>) {
        match result {
            Ok(()) => {
                // A retry that worked supersedes the earlier sign-out error.
                if self.last_error.as_deref() == Some(SIGN_OUT_FAILURE_MESSAGE) {
                    self.last_error = None;
                }
            }
            Err(err) => {
                warn!(code = err.code(), error = %err, "gate: sign-out failed");
                self.last_error = Some(SIGN_OUT_FAILURE_MESSAGE.to_string());
            }
        }
    }

    pub fn select_persona(&mut self, persona: Persona) {
        self.persona = persona;
    }
}

impl fmt::Debug for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateState")
            .field("initializing", &self.initializing)
            .field("session", &self.session)
            .field("form_mode", &self.form_mode)
            .field("submitting", &self.submitting)
            .field("last_error", &self.last_error)
            .field("email_input", &self.email_input)
            .field("password_len", &self.password_input.len())
            .field("persona", &self.persona)
            .finish()
    }
}
