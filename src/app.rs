//! Application state and core logic

use crate::config::LeadConfig;
use crate::error::{FormError, NETWORK_ERROR_MESSAGE};
use crate::state::{
    deliver, AppState, AttemptToken, FieldKind, FormController, FormKind, FormSnapshot, Outcome,
    StoreEvent, SubmissionStatus, View, HOME_ITEMS,
};
use crate::transport::{self, SubmissionTransport};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};

/// A submission running on its own task
struct InFlight {
    token: AttemptToken,
    reply: oneshot::Receiver<Outcome>,
}

/// A form controller with the backend it submits to
pub struct FormSlot {
    pub controller: FormController,
    transport: Arc<dyn SubmissionTransport>,
    /// Edits seen by the status bar
    changes: watch::Receiver<StoreEvent>,
    in_flight: Option<InFlight>,
}

impl FormSlot {
    fn new(controller: FormController, transport: Arc<dyn SubmissionTransport>) -> Self {
        let changes = controller.subscribe();
        Self {
            controller,
            transport,
            changes,
            in_flight: None,
        }
    }

    /// Consume pending change notifications; true if any arrived
    fn take_changes(&mut self) -> bool {
        let changed = self.changes.has_changed().unwrap_or(false);
        if changed {
            self.changes.borrow_and_update();
        }
        changed
    }

    /// Send the snapshot in the background so key handling carries on
    fn dispatch(&mut self, token: AttemptToken, snapshot: FormSnapshot) {
        let transport = Arc::clone(&self.transport);
        let timeout = self.controller.timeout();
        let (tx, reply) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = deliver(transport.as_ref(), token, &snapshot, timeout).await;
            // Nobody is listening once the app has quit
            let _ = tx.send(outcome);
        });
        self.in_flight = Some(InFlight { token, reply });
    }

    /// Outcome of the running attempt, once it has one
    fn try_outcome(&mut self) -> Option<(AttemptToken, Outcome)> {
        let in_flight = self.in_flight.as_mut()?;
        let outcome = match in_flight.reply.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => {
                tracing::warn!(
                    attempt = %in_flight.token.id(),
                    "submission task ended without a reply"
                );
                Outcome::Failed(NETWORK_ERROR_MESSAGE.to_string())
            }
        };
        let token = in_flight.token;
        self.in_flight = None;
        Some((token, outcome))
    }
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    pub waitlist: FormSlot,
    pub reservation: FormSlot,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create the app with the transports the config selects
    pub fn new(config: &LeadConfig) -> Result<Self> {
        let client = transport::build_http_client(config.timeout())?;
        let waitlist = transport::for_backend(
            config.backend_for(FormKind::Waitlist),
            client.clone(),
            config,
        );
        let reservation = transport::for_backend(
            config.backend_for(FormKind::Reservation),
            client,
            config,
        );
        tracing::info!(
            waitlist = waitlist.name(),
            reservation = reservation.name(),
            "transports ready"
        );
        Ok(Self::with_transports(config.timeout(), waitlist, reservation))
    }

    pub fn with_transports(
        timeout: Duration,
        waitlist: Box<dyn SubmissionTransport>,
        reservation: Box<dyn SubmissionTransport>,
    ) -> Self {
        Self {
            state: AppState::default(),
            waitlist: FormSlot::new(
                FormController::new(FormKind::Waitlist.schema(), timeout),
                waitlist.into(),
            ),
            reservation: FormSlot::new(
                FormController::new(FormKind::Reservation.schema(), timeout),
                reservation.into(),
            ),
            quit: false,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn form(&self, kind: FormKind) -> &FormController {
        match kind {
            FormKind::Waitlist => &self.waitlist.controller,
            FormKind::Reservation => &self.reservation.controller,
        }
    }

    fn controller_mut(&mut self, kind: FormKind) -> &mut FormController {
        &mut self.slot_mut(kind).controller
    }

    fn slot_mut(&mut self, kind: FormKind) -> &mut FormSlot {
        match kind {
            FormKind::Waitlist => &mut self.waitlist,
            FormKind::Reservation => &mut self.reservation,
        }
    }

    /// Clear the transient status message once the user edits a form
    pub fn poll_store_changes(&mut self) {
        let waitlist = self.waitlist.take_changes();
        let reservation = self.reservation.take_changes();
        if waitlist || reservation {
            self.state.status_message = None;
        }
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return Ok(());
        }
        match self.state.current_view.form_kind() {
            None => self.handle_home_key(key),
            Some(kind) if self.form(kind).status().is_succeeded() => {
                self.handle_success_key(kind, key)
            }
            Some(kind) => self.handle_form_key(kind, key),
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.state.home_up(),
            KeyCode::Down | KeyCode::Char('j') => self.state.home_down(),
            KeyCode::Char('1') => self.state.navigate(View::Waitlist),
            KeyCode::Char('2') => self.state.navigate(View::Reservation),
            KeyCode::Enter => {
                let kind = HOME_ITEMS[self.state.home_index];
                self.state.navigate(View::for_form(kind));
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_success_key(&mut self, kind: FormKind, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter => {
                self.controller_mut(kind).reset()?;
                self.state.reset_form_focus();
                self.state.status_message = None;
            }
            KeyCode::Esc => {
                self.state.go_back();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_form_key(&mut self, kind: FormKind, key: KeyEvent) -> Result<()> {
        let schema = self.form(kind).schema();
        let field_count = schema.field_count();
        let on_button = self.state.on_submit_button(field_count);

        match key.code {
            KeyCode::Esc => {
                self.state.go_back();
                return Ok(());
            }
            KeyCode::Tab => {
                self.state.next_form_field(field_count);
                return Ok(());
            }
            KeyCode::BackTab => {
                self.state.prev_form_field(field_count);
                return Ok(());
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return self.start_submit(kind);
            }
            KeyCode::Enter if on_button => return self.start_submit(kind),
            _ => {}
        }
        if on_button {
            return Ok(());
        }

        let spec = &schema.fields[self.state.active_form_field];
        let typing = !key.modifiers.contains(KeyModifiers::CONTROL);
        match spec.kind {
            FieldKind::Text { .. } | FieldKind::Email => match key.code {
                KeyCode::Char(c) if typing => self.controller_mut(kind).push_char(spec.name, c)?,
                KeyCode::Backspace => self.controller_mut(kind).pop_char(spec.name)?,
                KeyCode::Enter if spec.kind.is_multiline() => {
                    self.controller_mut(kind).push_char(spec.name, '\n')?
                }
                KeyCode::Enter => self.state.next_form_field(field_count),
                _ => {}
            },
            FieldKind::Choice(options) | FieldKind::MultiSelect(options) => match key.code {
                KeyCode::Left | KeyCode::Char('h') => self.state.option_left(options.len()),
                KeyCode::Right | KeyCode::Char('l') => self.state.option_right(options.len()),
                KeyCode::Char(' ') | KeyCode::Enter => {
                    let Some(option) = options.get(self.state.option_cursor) else {
                        return Ok(());
                    };
                    let controller = self.controller_mut(kind);
                    if spec.kind.is_multi() {
                        controller.toggle_multi_value(spec.name, option)?;
                    } else {
                        controller.set_field(spec.name, (*option).into())?;
                    }
                }
                _ => {}
            },
        }
        Ok(())
    }

    /// Validate and move the form to InFlight with the request running in
    /// the background; submits pressed meanwhile get AlreadyInFlight
    fn start_submit(&mut self, kind: FormKind) -> Result<()> {
        let message = match self.controller_mut(kind).begin_submit() {
            Ok((token, snapshot)) => {
                self.slot_mut(kind).dispatch(token, snapshot);
                None
            }
            Err(FormError::Validation(errors)) => {
                let first = errors.iter().next().map(|e| e.field);
                if let Some(index) = first.and_then(|f| self.form(kind).schema().index_of(f)) {
                    self.state.active_form_field = index;
                    self.state.option_cursor = 0;
                }
                Some(match errors.len() {
                    1 => "Please fix the highlighted field".to_string(),
                    count => format!("Please fix the {count} highlighted fields"),
                })
            }
            Err(e @ (FormError::AlreadyInFlight | FormError::InvalidTransition { .. })) => {
                Some(e.to_string())
            }
            Err(e) => return Err(e.into()),
        };
        self.state.status_message = message;
        Ok(())
    }

    /// Resolve any submission whose reply has arrived
    pub fn poll_submissions(&mut self) -> Result<()> {
        for &kind in HOME_ITEMS {
            if let Some((token, outcome)) = self.slot_mut(kind).try_outcome() {
                self.finish_submit(kind, token, outcome)?;
            }
        }
        Ok(())
    }

    fn finish_submit(
        &mut self,
        kind: FormKind,
        token: AttemptToken,
        outcome: Outcome,
    ) -> Result<()> {
        let slot = self.slot_mut(kind);
        slot.controller.resolve(token, outcome)?;
        // The reset that follows a success is not a user edit
        slot.take_changes();

        if self.state.current_view.form_kind() != Some(kind) {
            return Ok(());
        }
        let status = self.form(kind).status().clone();
        self.state.status_message = match status {
            SubmissionStatus::Failed { message } => Some(message),
            SubmissionStatus::Succeeded { .. } => {
                self.state.reset_form_focus();
                None
            }
            SubmissionStatus::Idle | SubmissionStatus::InFlight => None,
        };
        Ok(())
    }

    /// Wait until every running submission has been resolved
    #[cfg(test)]
    pub async fn settle_submissions(&mut self) -> Result<()> {
        while self.waitlist.in_flight.is_some() || self.reservation.in_flight.is_some() {
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.poll_submissions()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransportError, NETWORK_ERROR_MESSAGE};
    use crate::state::FieldValue;
    use crate::transport::MockSubmissionTransport;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap();
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
            .unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn idle_mock() -> MockSubmissionTransport {
        let mut mock = MockSubmissionTransport::new();
        mock.expect_submit().never();
        mock
    }

    fn app_with(waitlist: MockSubmissionTransport) -> App {
        App::with_transports(
            Duration::from_secs(15),
            Box::new(waitlist),
            Box::new(idle_mock()),
        )
    }

    /// Fill the waitlist from the home screen, leaving focus on the last field
    fn fill_waitlist(app: &mut App) {
        press(app, KeyCode::Enter);
        assert_eq!(app.state.current_view, View::Waitlist);
        type_text(app, "Jane Doe");
        press(app, KeyCode::Tab);
        type_text(app, "jane@example.com");
        for _ in 0..6 {
            press(app, KeyCode::Tab);
        }
        // contactOnLaunch: first option is "Yes"
        press(app, KeyCode::Char(' '));
    }

    #[test]
    fn test_home_navigation_and_quit() {
        let mut app = app_with(idle_mock());
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.current_view, View::Reservation);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state.current_view, View::Home);
        press(&mut app, KeyCode::Esc);
        assert!(!app.should_quit());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_ctrl_c_quits_from_a_form() {
        let mut app = app_with(idle_mock());
        press(&mut app, KeyCode::Enter);
        ctrl(&mut app, 'c');
        assert!(app.should_quit());
    }

    #[test]
    fn test_typing_edits_the_store() {
        let mut app = app_with(idle_mock());
        fill_waitlist(&mut app);
        let store = app.form(FormKind::Waitlist).store();
        assert_eq!(store.get("fullName"), Some(&FieldValue::from("Jane Doe")));
        assert_eq!(store.get("email"), Some(&FieldValue::from("jane@example.com")));
        assert_eq!(store.get("contactOnLaunch"), Some(&FieldValue::from("Yes")));
    }

    #[test]
    fn test_validation_focuses_first_missing_field() {
        let mut app = app_with(idle_mock());
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Tab);
        ctrl(&mut app, 's');

        assert_eq!(app.state.active_form_field, 0);
        assert_eq!(
            app.state.status_message.as_deref(),
            Some("Please fix the 3 highlighted fields")
        );
        assert_eq!(
            app.form(FormKind::Waitlist).status(),
            &SubmissionStatus::Idle
        );
    }

    /// Transport that holds every call until released, counting calls
    struct Gated {
        calls: Arc<AtomicUsize>,
        release: Arc<Notify>,
    }

    #[async_trait::async_trait]
    impl SubmissionTransport for Gated {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn submit(&self, _snapshot: &FormSnapshot) -> Result<(), TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Err(TransportError::Timeout)
        }
    }

    #[tokio::test]
    async fn test_submit_keys_rejected_while_request_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());
        let gated = Gated {
            calls: Arc::clone(&calls),
            release: Arc::clone(&release),
        };
        let mut app = App::with_transports(
            Duration::from_secs(15),
            Box::new(gated),
            Box::new(idle_mock()),
        );

        fill_waitlist(&mut app);
        ctrl(&mut app, 's');
        assert!(app.form(FormKind::Waitlist).status().is_in_flight());
        tokio::task::yield_now().await;

        // Both submit keys arrive while the request is still out
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        let refused = FormError::AlreadyInFlight.to_string();
        assert_eq!(app.state.status_message.as_deref(), Some(refused.as_str()));
        ctrl(&mut app, 's');
        app.poll_submissions().unwrap();
        assert!(app.form(FormKind::Waitlist).status().is_in_flight());

        release.notify_one();
        app.settle_submissions().await.unwrap();
        assert_eq!(
            app.state.status_message.as_deref(),
            Some(NETWORK_ERROR_MESSAGE)
        );
        // Nothing was queued behind the first attempt
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(app.form(FormKind::Waitlist).status().error_message().is_some());
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_while_request_runs() {
        let gated = Gated {
            calls: Arc::new(AtomicUsize::new(0)),
            release: Arc::new(Notify::new()),
        };
        let mut app = App::with_transports(
            Duration::from_secs(15),
            Box::new(gated),
            Box::new(idle_mock()),
        );

        fill_waitlist(&mut app);
        ctrl(&mut app, 's');
        ctrl(&mut app, 'c');
        assert!(app.should_quit());
        assert!(app.form(FormKind::Waitlist).status().is_in_flight());
    }

    #[tokio::test]
    async fn test_submit_success_then_submit_another() {
        let mut mock = MockSubmissionTransport::new();
        mock.expect_name().return_const("mock");
        mock.expect_submit().times(1).returning(|_| Ok(()));
        let mut app = app_with(mock);

        fill_waitlist(&mut app);
        ctrl(&mut app, 's');
        app.settle_submissions().await.unwrap();
        assert!(app.form(FormKind::Waitlist).status().is_succeeded());
        assert_eq!(app.state.active_form_field, 0);

        app.poll_store_changes();
        assert!(app.form(FormKind::Waitlist).store().is_pristine());

        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.form(FormKind::Waitlist).status(),
            &SubmissionStatus::Idle
        );
    }

    #[tokio::test]
    async fn test_failure_message_cleared_by_next_edit() {
        let mut mock = MockSubmissionTransport::new();
        mock.expect_name().return_const("mock");
        mock.expect_submit()
            .times(1)
            .returning(|_| Err(TransportError::Timeout));
        let mut app = app_with(mock);

        fill_waitlist(&mut app);
        ctrl(&mut app, 's');
        app.settle_submissions().await.unwrap();
        app.poll_store_changes();
        assert_eq!(
            app.state.status_message.as_deref(),
            Some(NETWORK_ERROR_MESSAGE)
        );
        // Values are kept for a retry
        assert_eq!(
            app.form(FormKind::Waitlist).store().get("fullName"),
            Some(&FieldValue::from("Jane Doe"))
        );

        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        type_text(&mut app, "x");
        app.poll_store_changes();
        assert_eq!(app.state.status_message, None);
    }

    #[test]
    fn test_poll_without_submissions_is_noop() {
        let mut app = app_with(idle_mock());
        app.poll_submissions().unwrap();
        assert_eq!(app.state.status_message, None);
    }

    #[test]
    fn test_multi_select_toggle_by_keys() {
        let mut app = app_with(idle_mock());
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            app.form(FormKind::Reservation).store().get("preferredTools"),
            Some(&FieldValue::from(vec!["Canva", "ChatGPT"]))
        );
    }

    #[test]
    fn test_multiline_enter_adds_newline() {
        let mut app = app_with(idle_mock());
        press(&mut app, KeyCode::Enter);
        for _ in 0..4 {
            press(&mut app, KeyCode::Tab);
        }
        type_text(&mut app, "a");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "b");
        assert_eq!(
            app.form(FormKind::Waitlist).store().get("tools"),
            Some(&FieldValue::from("a\nb"))
        );
    }
}
