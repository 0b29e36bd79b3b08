//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use guardiao_core::content::Persona;
use guardiao_core::gate::Mode;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, FormField};

/// Lines moved by PageUp/PageDown on the content screen.
const PAGE_SCROLL: u16 = 10;

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            handle_key(app, key)
        }
        UiEvent::Terminal(_) => vec![],
        UiEvent::SessionChanged(change) => {
            app.gate.on_session_changed(change);
            app.scroll = 0;
            vec![]
        }
        UiEvent::SubmitFinished(result) => {
            let succeeded = result.is_ok();
            app.gate.on_submit_result(result);
            if succeeded {
                app.focus = FormField::Email;
            }
            vec![]
        }
        UiEvent::SignOutFinished(result) => {
            app.gate.on_sign_out_result(result);
            vec![]
        }
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }

    match app.gate.mode() {
        Mode::Loading => match key.code {
            KeyCode::Esc => vec![UiEffect::Quit],
            _ => vec![],
        },
        Mode::Unauthenticated => handle_form_key(app, key),
        Mode::Authenticated => handle_content_key(app, key),
    }
}

fn handle_form_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => vec![UiEffect::Quit],
        KeyCode::Enter => app
            .gate
            .submit()
            .map(UiEffect::Session)
            .into_iter()
            .collect(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.focus = app.focus.next();
            vec![]
        }
        KeyCode::Char('t') if ctrl => {
            app.gate.toggle_form_mode();
            vec![]
        }
        // Inputs are frozen while a submit is in flight.
        _ if app.gate.is_submitting() => vec![],
        KeyCode::Backspace => {
            app.focused_input_mut().pop();
            vec![]
        }
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            app.focused_input_mut().push(c);
            vec![]
        }
        _ => vec![],
    }
}

fn handle_content_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => vec![UiEffect::Quit],
        KeyCode::Char('o') => vec![UiEffect::Session(app.gate.sign_out())],
        KeyCode::Char('1') | KeyCode::Left => select_persona(app, Persona::Parent),
        KeyCode::Char('2') | KeyCode::Right => select_persona(app, Persona::Student),
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll = app.scroll.saturating_sub(1);
            vec![]
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll = app.scroll.saturating_add(1);
            vec![]
        }
        KeyCode::PageUp => {
            app.scroll = app.scroll.saturating_sub(PAGE_SCROLL);
            vec![]
        }
        KeyCode::PageDown => {
            app.scroll = app.scroll.saturating_add(PAGE_SCROLL);
            vec![]
        }
        KeyCode::Home => {
            app.scroll = 0;
            vec![]
        }
        _ => vec![],
    }
}

fn select_persona(app: &mut AppState, persona: Persona) -> Vec<UiEffect> {
    if app.gate.persona == persona {
        return vec![];
    }
    app.gate.select_persona(persona);
    vec![UiEffect::PersistPersona { persona }]
}

#[cfg(test)]
mod tests {
    use guardiao_core::gate::{FILL_IN_MESSAGE, GateEffect};
    use guardiao_core::session::{AuthError, Session};

    use super::*;

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(c: char) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
        )))
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            update(app, key(KeyCode::Char(c)));
        }
    }

    fn session() -> Session {
        Session {
            user_id: "uid-1".to_string(),
            email: "a@b.com".to_string(),
        }
    }

    fn signed_out_app() -> AppState {
        let mut app = AppState::new(Persona::Parent);
        update(&mut app, UiEvent::SessionChanged(None));
        app
    }

    fn signed_in_app() -> AppState {
        let mut app = AppState::new(Persona::Parent);
        update(&mut app, UiEvent::SessionChanged(Some(session())));
        app
    }

    #[test]
    fn test_loading_ignores_typing() {
        let mut app = AppState::new(Persona::Parent);
        assert_eq!(app.gate.mode(), Mode::Loading);

        type_text(&mut app, "abc");
        assert!(update(&mut app, key(KeyCode::Enter)).is_empty());
        assert!(app.gate.email_input.is_empty());
        assert!(matches!(
            update(&mut app, key(KeyCode::Esc)).as_slice(),
            [UiEffect::Quit]
        ));
    }

    #[test]
    fn test_typing_follows_focus() {
        let mut app = signed_out_app();
        type_text(&mut app, "a@b.com");
        update(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "secret1");
        update(&mut app, key(KeyCode::Backspace));

        assert_eq!(app.gate.email_input, "a@b.com");
        assert_eq!(app.gate.password_input, "secret");
        assert_eq!(app.focus, FormField::Password);
    }

    #[test]
    fn test_enter_submits_filled_form() {
        let mut app = signed_out_app();
        type_text(&mut app, "a@b.com");
        update(&mut app, key(KeyCode::Down));
        type_text(&mut app, "secret1");

        let effects = update(&mut app, key(KeyCode::Enter));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::Session(GateEffect::SignIn { email, password })]
                if email == "a@b.com" && password == "secret1"
        ));
        assert!(app.gate.is_submitting());

        // Second Enter while in flight is ignored, and inputs are frozen.
        assert!(update(&mut app, key(KeyCode::Enter)).is_empty());
        type_text(&mut app, "x");
        assert_eq!(app.gate.password_input, "secret1");
    }

    #[test]
    fn test_enter_with_empty_field_shows_fill_in() {
        let mut app = signed_out_app();
        type_text(&mut app, "a@b.com");
        assert!(update(&mut app, key(KeyCode::Enter)).is_empty());
        assert_eq!(app.gate.last_error(), Some(FILL_IN_MESSAGE));
    }

    #[test]
    fn test_ctrl_t_switches_to_signup() {
        let mut app = signed_out_app();
        update(&mut app, ctrl('t'));
        type_text(&mut app, "a@b.com");
        update(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "secret1");

        assert!(app.gate.email_input == "a@b.com");
        assert!(matches!(
            update(&mut app, key(KeyCode::Enter)).as_slice(),
            [UiEffect::Session(GateEffect::SignUp { .. })]
        ));
    }

    #[test]
    fn test_submit_success_resets_focus_and_waits_for_notification() {
        let mut app = signed_out_app();
        type_text(&mut app, "a@b.com");
        update(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "secret1");
        update(&mut app, key(KeyCode::Enter));

        update(&mut app, UiEvent::SubmitFinished(Ok(())));
        assert_eq!(app.focus, FormField::Email);
        assert!(app.gate.password_input.is_empty());
        assert_eq!(app.gate.mode(), Mode::Unauthenticated);

        update(&mut app, UiEvent::SessionChanged(Some(session())));
        assert_eq!(app.gate.mode(), Mode::Authenticated);
    }

    #[test]
    fn test_submit_failure_keeps_inputs() {
        let mut app = signed_out_app();
        type_text(&mut app, "a@b.com");
        update(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "wrong");
        update(&mut app, key(KeyCode::Enter));

        update(
            &mut app,
            UiEvent::SubmitFinished(Err(AuthError::rejected("wrong-password"))),
        );
        assert_eq!(app.gate.last_error(), Some("Incorrect password."));
        assert_eq!(app.gate.password_input, "wrong");
        assert!(!app.gate.is_submitting());
    }

    #[test]
    fn test_content_keys() {
        let mut app = signed_in_app();

        let effects = update(&mut app, key(KeyCode::Char('2')));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::PersistPersona {
                persona: Persona::Student
            }]
        ));
        assert_eq!(app.gate.persona, Persona::Student);

        // Reselecting the same persona persists nothing.
        assert!(update(&mut app, key(KeyCode::Right)).is_empty());
        update(&mut app, key(KeyCode::Left));
        assert_eq!(app.gate.persona, Persona::Parent);

        update(&mut app, key(KeyCode::PageDown));
        update(&mut app, key(KeyCode::Up));
        assert_eq!(app.scroll, PAGE_SCROLL - 1);

        assert!(matches!(
            update(&mut app, key(KeyCode::Char('o'))).as_slice(),
            [UiEffect::Session(GateEffect::SignOut)]
        ));
        // Still authenticated until the store reports the sign-out.
        assert_eq!(app.gate.mode(), Mode::Authenticated);

        update(&mut app, UiEvent::SessionChanged(None));
        assert_eq!(app.gate.mode(), Mode::Unauthenticated);
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_q_quits_only_on_content() {
        let mut app = signed_out_app();
        assert!(update(&mut app, key(KeyCode::Char('q'))).is_empty());
        assert_eq!(app.gate.email_input, "q");

        let mut app = signed_in_app();
        assert!(matches!(
            update(&mut app, key(KeyCode::Char('q'))).as_slice(),
            [UiEffect::Quit]
        ));
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        for mut app in [
            AppState::new(Persona::Parent),
            signed_out_app(),
            signed_in_app(),
        ] {
            assert!(matches!(
                update(&mut app, ctrl('c')).as_slice(),
                [UiEffect::Quit]
            ));
        }
    }

    #[test]
    fn test_sign_out_failure_is_shown() {
        let mut app = signed_in_app();
        update(
            &mut app,
            UiEvent::SignOutFinished(Err(AuthError::Persistence("disk".to_string()))),
        );
        assert_eq!(app.gate.mode(), Mode::Authenticated);
        assert!(app.gate.last_error().is_some());
    }
}
