//! Layout components (content area, status bar)

use crate::app::App;
use crate::state::SubmissionStatus;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split off the bottom line for the status bar
pub fn create_layout(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    chunks[0]
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![Span::raw(" ")];

    // Submission state of the open form
    if let Some(kind) = app.state.current_view.form_kind() {
        let status = app.form(kind).status();
        let color = match status {
            SubmissionStatus::Idle => Color::Gray,
            SubmissionStatus::InFlight => Color::Yellow,
            SubmissionStatus::Succeeded { .. } => Color::Green,
            SubmissionStatus::Failed { .. } => Color::Red,
        };
        spans.push(Span::styled(
            format!("● {} ", status.label()),
            Style::default().fg(color),
        ));
    }

    let hints = get_view_hints(app);
    spans.push(Span::styled(hints, Style::default().fg(Color::Gray)));

    if let Some(msg) = &app.state.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg.as_str(), Style::default().fg(Color::Yellow)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    // Quit hint on the right
    let quit_hint = " ^C:quit ";
    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: (quit_hint.len() as u16).min(area.width),
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Keyboard hints for the current view
fn get_view_hints(app: &App) -> &'static str {
    match app.state.current_view.form_kind() {
        None => "j/k:nav  Enter:open  1/2:jump  q:quit",
        Some(kind) if app.form(kind).status().is_succeeded() => "Enter:submit another  Esc:back",
        Some(_) => "Tab:next  Space:select  ^S:submit  Esc:back",
    }
}
