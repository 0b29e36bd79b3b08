//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer never calls the session store or touches the config file
//! itself.

use guardiao_core::content::Persona;
use guardiao_core::gate::GateEffect;

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Run a session store call requested by the gate.
    Session(GateEffect),

    /// Persist the persona preference to config.
    PersistPersona { persona: Persona },
}
