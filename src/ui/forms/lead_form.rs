//! Waitlist and reservation form view

use super::field_renderer::{draw_field, draw_help_text, field_height};
use crate::app::App;
use crate::state::{FormController, FormKind, FormSchema};
use crate::ui::components::{button_width, render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const SUBMIT_LABEL: &str = "Submit";
const SUBMITTING_LABEL: &str = "Submitting...";

/// First field to draw so that the focused row (a field, or the action panel
/// when `focus == fields.len()`) fits in `available` rows
pub fn first_visible_field(schema: &FormSchema, focus: usize, available: u16) -> usize {
    let heights: Vec<u16> = schema
        .fields
        .iter()
        .map(field_height)
        .chain(std::iter::once(BUTTON_HEIGHT))
        .collect();
    let focus = focus.min(heights.len() - 1);

    let mut first = 0;
    while first < focus && heights[first..=focus].iter().sum::<u16>() > available {
        first += 1;
    }
    first
}

/// Draw a lead-capture form
pub fn draw(frame: &mut Frame, area: Rect, app: &App, kind: FormKind) {
    let form = app.form(kind);
    let schema = form.schema();

    let block = Block::default()
        .title(format!(" {} ", schema.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(0),    // Fields and action panel
            Constraint::Length(1), // Help text
        ])
        .split(inner);
    let body = chunks[0];

    let focus = app.state.active_form_field;
    let first = first_visible_field(schema, focus, body.height);

    let mut y = body.y;
    let bottom = body.y + body.height;
    for (idx, spec) in schema.fields.iter().enumerate().skip(first) {
        let height = field_height(spec);
        if y + height > bottom {
            break;
        }
        let Some(value) = form.store().get(spec.name) else {
            continue;
        };
        let error = form.validation_errors().get(spec.name);
        draw_field(
            frame,
            Rect::new(body.x, y, body.width, height),
            spec,
            value,
            focus == idx,
            app.state.option_cursor,
            error,
        );
        y += height;
    }

    if y + BUTTON_HEIGHT <= bottom {
        draw_action_panel(
            frame,
            Rect::new(body.x, y, body.width, BUTTON_HEIGHT),
            form,
            app.state.on_submit_button(schema.field_count()),
        );
    }

    draw_help_text(
        frame,
        chunks[1],
        "Required fields are marked *. Ctrl+S submits from any field.",
    );
}

/// Submit button plus the failure message of the last attempt
fn draw_action_panel(frame: &mut Frame, area: Rect, form: &FormController, is_selected: bool) {
    let status = form.status();
    let in_flight = status.is_in_flight();
    let label = if in_flight {
        SUBMITTING_LABEL
    } else {
        SUBMIT_LABEL
    };

    let width = button_width(SUBMITTING_LABEL).min(area.width);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(width), Constraint::Min(0)])
        .split(area);

    render_button(frame, chunks[0], label, is_selected, !in_flight);

    if let Some(message) = status.error_message() {
        let error = Paragraph::new(format!(" {message}"))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        // Vertically centre against the button
        let row = Rect {
            y: chunks[1].y + 1,
            height: chunks[1].height.saturating_sub(1),
            ..chunks[1]
        };
        frame.render_widget(error, row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{RESERVATION, WAITLIST};

    #[test]
    fn test_everything_visible_when_tall_enough() {
        assert_eq!(first_visible_field(&WAITLIST, 0, 200), 0);
        assert_eq!(
            first_visible_field(&WAITLIST, WAITLIST.field_count(), 200),
            0
        );
    }

    #[test]
    fn test_scrolls_to_keep_focus_visible() {
        // biggestStruggle, contactInfo and the button fit in 9 rows
        let focus = RESERVATION.field_count();
        assert_eq!(first_visible_field(&RESERVATION, focus, 10), 6);
    }

    #[test]
    fn test_focus_itself_never_skipped() {
        assert_eq!(first_visible_field(&WAITLIST, 4, 1), 4);
    }
}
