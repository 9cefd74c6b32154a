//! Field rendering utilities for forms

use crate::state::{FieldKind, FieldSpec, FieldValue};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const CURSOR: &str = "▌";

/// Rows a field occupies, borders included
pub fn field_height(spec: &FieldSpec) -> u16 {
    match spec.kind {
        FieldKind::Text { multiline: true } => 6,
        FieldKind::MultiSelect(_) => 4,
        FieldKind::Text { multiline: false } | FieldKind::Email | FieldKind::Choice(_) => 3,
    }
}

/// Border block with the label, a `*` for required fields and the
/// validation message along the bottom edge
fn field_block<'a>(spec: &FieldSpec, is_active: bool, error: Option<&'a str>) -> Block<'a> {
    let border_style = match (error, is_active) {
        (Some(_), _) => Style::default().fg(Color::Red),
        (None, true) => Style::default().fg(Color::Cyan),
        (None, false) => Style::default().fg(Color::DarkGray),
    };

    let mut title = vec![Span::raw(format!(" {}", spec.label))];
    if spec.required {
        title.push(Span::styled(" *", Style::default().fg(Color::Red)));
    }
    title.push(Span::raw(" "));

    let mut block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(border_style);
    if let Some(message) = error {
        block = block.title_bottom(Span::styled(
            format!(" {message} "),
            Style::default().fg(Color::Red),
        ));
    }
    block
}

/// Draw a text, multiline or email field
pub fn draw_text_field(
    frame: &mut Frame,
    area: Rect,
    spec: &FieldSpec,
    value: &FieldValue,
    is_active: bool,
    error: Option<&str>,
) {
    let text = value.as_text();
    let text_style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let cursor = Span::styled(
        if is_active { CURSOR } else { "" },
        Style::default().fg(Color::Cyan),
    );

    let content = if text.is_empty() && !is_active {
        Paragraph::new(Span::styled("(empty)", Style::default().fg(Color::DarkGray)))
    } else if spec.kind.is_multiline() {
        // `lines()` drops a trailing newline, which is where the cursor sits
        let mut lines: Vec<Line> = text
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), text_style)))
            .collect();
        if let Some(last) = lines.last_mut() {
            last.spans.push(cursor);
        }
        Paragraph::new(lines)
    } else {
        Paragraph::new(Line::from(vec![Span::styled(text, text_style), cursor]))
    };

    frame.render_widget(
        content
            .wrap(Wrap { trim: false })
            .block(field_block(spec, is_active, error)),
        area,
    );
}

/// Draw a single-choice or multi-select field as a row of options
///
/// `cursor` is the highlighted option and only matters while active.
pub fn draw_options_field(
    frame: &mut Frame,
    area: Rect,
    spec: &FieldSpec,
    value: &FieldValue,
    is_active: bool,
    cursor: usize,
    error: Option<&str>,
) {
    let multi = spec.kind.is_multi();
    let mut spans = Vec::new();
    for (idx, option) in spec.kind.options().iter().enumerate() {
        let checked = value.contains(option);
        let marker = match (multi, checked) {
            (true, true) => "[x]",
            (true, false) => "[ ]",
            (false, true) => "(•)",
            (false, false) => "( )",
        };

        let mut style = if checked {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        if is_active && idx == cursor {
            style = style.fg(Color::Cyan).add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(format!("{marker} {option}"), style));
        spans.push(Span::raw("  "));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: true })
            .block(field_block(spec, is_active, error)),
        area,
    );
}

/// Draw any schema field, dispatching on its kind
pub fn draw_field(
    frame: &mut Frame,
    area: Rect,
    spec: &FieldSpec,
    value: &FieldValue,
    is_active: bool,
    option_cursor: usize,
    error: Option<&str>,
) {
    match spec.kind {
        FieldKind::Text { .. } | FieldKind::Email => {
            draw_text_field(frame, area, spec, value, is_active, error)
        }
        FieldKind::Choice(_) | FieldKind::MultiSelect(_) => {
            draw_options_field(frame, area, spec, value, is_active, option_cursor, error)
        }
    }
}

/// Draw help text for a form
pub fn draw_help_text(frame: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}
