//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui Frame, and never mutate
//! state or return effects. The `*_lines` builders are split out so the
//! screen contents can be checked without a terminal.

use guardiao_core::content::{self, Persona};
use guardiao_core::gate::Mode;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::state::{AppState, FormField};

/// Spinner frames for the loading and submitting indicators.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

const FORM_WIDTH: u16 = 60;
const FORM_HEIGHT: u16 = 14;

/// Placeholder shown instead of each password character.
const PASSWORD_MASK: char = '•';

const ACCENT: Color = Color::Cyan;

/// Renders the screen for the current gate mode.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    match app.gate.mode() {
        Mode::Loading => render_loading(app, frame, area),
        Mode::Unauthenticated => render_form(app, frame, area),
        Mode::Authenticated => render_content(app, frame, area),
    }
}

fn spinner(frame: usize) -> &'static str {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

/// Centers a `width` x `height` box inside `area`, clamped to fit.
fn centered_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(format!(" {title} "))
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
}

// ============================================================================
// Loading
// ============================================================================

fn render_loading(app: &AppState, frame: &mut Frame, area: Rect) {
    let lines = loading_lines(app.spinner_frame);
    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let popup = centered_area(area, 40, height);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), popup);
}

pub fn loading_lines(spinner_frame: usize) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            content::HERO.eyebrow,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} Loading session...", spinner(spinner_frame)),
            Style::default().fg(Color::Yellow),
        )),
    ]
}

// ============================================================================
// Login / signup form
// ============================================================================

fn render_form(app: &AppState, frame: &mut Frame, area: Rect) {
    let popup = centered_area(area, FORM_WIDTH, FORM_HEIGHT);
    frame.render_widget(Clear, popup);

    let title = format!("{} | {}", content::HERO.eyebrow, app.gate.form_mode().title());
    let para = Paragraph::new(form_lines(app))
        .block(titled_block(&title))
        .wrap(Wrap { trim: false });
    frame.render_widget(para, popup);
}

pub fn form_lines(app: &AppState) -> Vec<Line<'static>> {
    let gate = &app.gate;
    let masked: String = gate.password_input.chars().map(|_| PASSWORD_MASK).collect();

    let mut lines = vec![
        Line::from(""),
        input_line("Email", &gate.email_input, app.focus == FormField::Email),
        Line::from(""),
        input_line("Password", &masked, app.focus == FormField::Password),
        Line::from(""),
    ];

    if gate.is_submitting() {
        lines.push(Line::from(Span::styled(
            format!("{} Please wait...", spinner(app.spinner_frame)),
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(error) = gate.last_error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(""));
    let other = gate.form_mode().toggled().title().to_lowercase();
    lines.push(hints_line(&[
        ("Enter", gate.form_mode().title().to_lowercase()),
        ("Tab", "switch field".to_string()),
        ("Ctrl+T", other),
        ("Esc", "quit".to_string()),
    ]));
    lines
}

fn input_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let label_style = if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![
        Span::styled(format!("{label:>9}: "), label_style),
        Span::raw(value.to_string()),
    ];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(ACCENT)));
    }
    Line::from(spans)
}

fn hints_line(hints: &[(&str, String)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled((*key).to_string(), Style::default().fg(ACCENT)));
        spans.push(Span::styled(
            format!(" {action}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

// ============================================================================
// Content
// ============================================================================

fn render_content(app: &AppState, frame: &mut Frame, area: Rect) {
    let title = match app.gate.session() {
        Some(session) => format!("{} | {}", content::HERO.eyebrow, session.email),
        None => content::HERO.eyebrow.to_string(),
    };
    let para = Paragraph::new(content_lines(app))
        .block(titled_block(&title))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(para, area);
}

pub fn content_lines(app: &AppState) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::from(Span::styled(content::HERO.title, bold.fg(ACCENT))),
        Line::from(content::HERO.body),
        Line::from(""),
        persona_line(app.gate.persona),
    ];

    for card in app.gate.persona.cards() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}: ", card.label), dim),
            Span::styled(card.value, bold),
        ]));
    }

    for section in content::SECTIONS {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(section.title, bold)));
        lines.push(Line::from(section.body));
        if !section.actions.is_empty() {
            // First action is the primary one.
            let actions: Vec<Span<'static>> = section
                .actions
                .iter()
                .enumerate()
                .map(|(i, action)| {
                    let style = if i == 0 {
                        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    Span::styled(format!("[{action}] "), style)
                })
                .collect();
            lines.push(Line::from(actions));
        }
    }

    lines.push(Line::from(""));
    if let Some(error) = app.gate.last_error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(hints_line(&[
        ("1/2", "persona".to_string()),
        ("↑/↓", "scroll".to_string()),
        ("o", "sign out".to_string()),
        ("q", "quit".to_string()),
    ]));
    lines.push(Line::from(Span::styled(content::FOOTER, dim)));
    lines
}

fn persona_line(selected: Persona) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, persona) in Persona::all().iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let label = format!(" {} {} ", i + 1, persona.label());
        let style = if *persona == selected {
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}
