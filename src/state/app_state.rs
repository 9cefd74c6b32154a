//! Application state definitions

use super::forms::FormKind;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Waitlist,
    Reservation,
}

impl View {
    /// Form shown by this view, if any
    pub fn form_kind(&self) -> Option<FormKind> {
        match self {
            View::Home => None,
            View::Waitlist => Some(FormKind::Waitlist),
            View::Reservation => Some(FormKind::Reservation),
        }
    }

    pub fn for_form(kind: FormKind) -> Self {
        match kind {
            FormKind::Waitlist => View::Waitlist,
            FormKind::Reservation => View::Reservation,
        }
    }
}

/// Entries of the home menu, in display order
pub const HOME_ITEMS: &[FormKind] = &[FormKind::Waitlist, FormKind::Reservation];

/// Main application state
#[derive(Debug, Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,
    pub view_history: Vec<View>,

    // Home menu selection
    pub home_index: usize,

    // Form focus: indices below the field count are fields, the field
    // count itself is the Submit button
    pub active_form_field: usize,
    /// Highlighted option within a choice or multi-select field
    pub option_cursor: usize,

    /// Transient message shown in the status bar
    pub status_message: Option<String>,
}

impl AppState {
    /// Switch views, remembering where we came from
    pub fn navigate(&mut self, view: View) {
        self.view_history.push(self.current_view);
        self.current_view = view;
        self.reset_form_focus();
    }

    /// Return to the previous view; returns false when already at the root
    pub fn go_back(&mut self) -> bool {
        match self.view_history.pop() {
            Some(view) => {
                self.current_view = view;
                self.reset_form_focus();
                true
            }
            None => false,
        }
    }

    pub fn reset_form_focus(&mut self) {
        self.active_form_field = 0;
        self.option_cursor = 0;
    }

    /// Move to next form field, wrapping past the Submit button
    pub fn next_form_field(&mut self, field_count: usize) {
        self.active_form_field = (self.active_form_field + 1) % (field_count + 1);
        self.option_cursor = 0;
    }

    /// Move to previous form field
    pub fn prev_form_field(&mut self, field_count: usize) {
        if self.active_form_field == 0 {
            self.active_form_field = field_count;
        } else {
            self.active_form_field -= 1;
        }
        self.option_cursor = 0;
    }

    pub fn on_submit_button(&self, field_count: usize) -> bool {
        self.active_form_field == field_count
    }

    pub fn option_left(&mut self, option_count: usize) {
        if option_count == 0 {
            return;
        }
        self.option_cursor = if self.option_cursor == 0 {
            option_count - 1
        } else {
            self.option_cursor - 1
        };
    }

    pub fn option_right(&mut self, option_count: usize) {
        if option_count == 0 {
            return;
        }
        self.option_cursor = (self.option_cursor + 1) % option_count;
    }

    pub fn home_up(&mut self) {
        self.home_index = self.home_index.saturating_sub(1);
    }

    pub fn home_down(&mut self) {
        self.home_index = (self.home_index + 1).min(HOME_ITEMS.len() - 1);
    }
}
