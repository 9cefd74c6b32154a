//! UI module for rendering the TUI

mod components;
mod forms;
mod home;
mod layout;

use crate::app::App;
use crate::state::View;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let main_area = layout::create_layout(frame.area());

    match app.state.current_view {
        View::Home => home::draw(frame, main_area, app),
        View::Waitlist | View::Reservation => {
            if let Some(kind) = app.state.current_view.form_kind() {
                if app.form(kind).status().is_succeeded() {
                    forms::draw_success(frame, main_area, app, kind);
                } else {
                    forms::draw_lead_form(frame, main_area, app, kind);
                }
            }
        }
    }

    layout::draw_status_bar(frame, app);
}
