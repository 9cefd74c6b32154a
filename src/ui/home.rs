//! Home view: pick a form

use super::components::{render_button, BUTTON_HEIGHT};
use crate::app::App;
use crate::state::HOME_ITEMS;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};

const MENU_WIDTH: u16 = 40;

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let mut constraints = vec![Constraint::Min(0), Constraint::Length(3)];
    constraints.extend(HOME_ITEMS.iter().map(|_| Constraint::Length(BUTTON_HEIGHT)));
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let header = Paragraph::new(vec![
        Line::styled(
            "AccessLoop",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            "Shared access to the tools you use every day",
            Style::default().fg(Color::DarkGray),
        ),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(header, chunks[1]);

    for (idx, kind) in HOME_ITEMS.iter().enumerate() {
        let row = chunks[idx + 2];
        let width = MENU_WIDTH.min(row.width);
        let button_area = Rect {
            x: row.x + row.width.saturating_sub(width) / 2,
            width,
            ..row
        };
        let content = format!("{} {}", idx + 1, kind.schema().title);
        render_button(
            frame,
            button_area,
            &content,
            app.state.home_index == idx,
            true,
        );
    }
}
