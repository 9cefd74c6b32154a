//! Thank-you panel shown after a form is accepted

use crate::app::App;
use crate::state::{FormKind, SubmissionStatus};
use crate::ui::components::{button_width, render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SUBMIT_ANOTHER: &str = "Submit another";

fn thank_you(kind: FormKind) -> (&'static str, &'static str) {
    match kind {
        FormKind::Waitlist => (
            "You're on the waitlist!",
            "We'll reach out as soon as AccessLoop launches.",
        ),
        FormKind::Reservation => (
            "Your spot is reserved!",
            "We'll contact you with next steps before launch.",
        ),
    }
}

pub fn draw(frame: &mut Frame, area: Rect, app: &App, kind: FormKind) {
    let form = app.form(kind);
    let (headline, detail) = thank_you(kind);

    let block = Block::default()
        .title(format!(" {} ", form.schema().title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(4), // Message
            Constraint::Length(BUTTON_HEIGHT),
            Constraint::Min(0),
        ])
        .split(inner);

    let mut lines = vec![
        Line::styled(
            headline,
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::raw(detail),
    ];
    if let SubmissionStatus::Succeeded { at } = form.status() {
        lines.push(Line::styled(
            format!("Received {}", at.format("%Y-%m-%d %H:%M UTC")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        chunks[1],
    );

    let width = button_width(SUBMIT_ANOTHER).min(chunks[2].width);
    let button_area = Rect {
        x: chunks[2].x + chunks[2].width.saturating_sub(width) / 2,
        width,
        ..chunks[2]
    };
    render_button(frame, button_area, SUBMIT_ANOTHER, true, true);
}
