//! UI event types.
//!
//! Everything the reducer reacts to arrives as a [`UiEvent`]: terminal input,
//! the frame tick, session notifications and the results of store calls the
//! runtime ran on the reducer's behalf.

use crossterm::event::Event;
use guardiao_core::session::{AuthError, SessionChange};

#[derive(Debug)]
pub enum UiEvent {
    /// Periodic tick (spinner animation, render cadence).
    Tick,

    /// Raw terminal event.
    Terminal(Event),

    /// The session store reported a transition.
    SessionChanged(SessionChange),

    /// A sign-in or sign-up call finished.
    SubmitFinished(Result<(), AuthError>),

    /// A sign-out call finished.
    SignOutFinished(Result<(), AuthError>),
}
