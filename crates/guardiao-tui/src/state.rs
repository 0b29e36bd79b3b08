//! Application state.
//!
//! ```text
//! AppState
//! ├── gate: GateState     (session, form, error, persona)
//! ├── focus: FormField    (which input receives typing)
//! ├── scroll: u16         (content screen offset)
//! └── spinner_frame       (loading/submitting animation)
//! ```

use guardiao_core::content::Persona;
use guardiao_core::gate::GateState;

/// Form input that receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Email,
    Password,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Email => FormField::Password,
            FormField::Password => FormField::Email,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub gate: GateState,
    pub focus: FormField,
    /// Vertical scroll of the content screen, in lines.
    pub scroll: u16,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(persona: Persona) -> Self {
        Self {
            gate: GateState::new(persona),
            focus: FormField::Email,
            scroll: 0,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    /// Returns the focused input for editing.
    pub fn focused_input_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Email => &mut self.gate.email_input,
            FormField::Password => &mut self.gate.password_input,
        }
    }
}
