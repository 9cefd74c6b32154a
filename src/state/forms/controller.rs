//! Form controller tying the field store, validation, state machine and
//! transport together

use super::field::FieldValue;
use super::schema::{FieldKind, FormSchema};
use super::store::{FieldStore, FormSnapshot, StoreEvent};
use super::submission::{AttemptToken, Outcome, SubmissionMachine, SubmissionStatus};
use crate::error::{FormError, TransportError, ValidationErrors, NETWORK_ERROR_MESSAGE};
use crate::transport::SubmissionTransport;
use std::time::Duration;
use tokio::sync::watch;

/// Loose `local@domain.tld` shape check, mirroring an HTML email input
pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// One lead-capture form: its values, validation messages and submission
#[derive(Debug)]
pub struct FormController {
    store: FieldStore,
    machine: SubmissionMachine,
    errors: ValidationErrors,
    timeout: Duration,
}

impl FormController {
    pub fn new(schema: &'static FormSchema, timeout: Duration) -> Self {
        Self {
            store: FieldStore::new(schema),
            machine: SubmissionMachine::default(),
            errors: ValidationErrors::default(),
            timeout,
        }
    }

    pub fn schema(&self) -> &'static FormSchema {
        self.store.schema()
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    pub fn status(&self) -> &SubmissionStatus {
        self.machine.status()
    }

    /// Upper bound on one transport call
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Validation messages from the last blocked submit
    pub fn validation_errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreEvent> {
        self.store.subscribe()
    }

    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), FormError> {
        self.store.set_field(name, value)?;
        self.errors.clear_field(name);
        Ok(())
    }

    pub fn toggle_multi_value(&mut self, name: &str, option: &str) -> Result<(), FormError> {
        self.store.toggle_multi_value(name, option)?;
        self.errors.clear_field(name);
        Ok(())
    }

    pub fn push_char(&mut self, name: &str, c: char) -> Result<(), FormError> {
        self.store.push_char(name, c)?;
        self.errors.clear_field(name);
        Ok(())
    }

    pub fn pop_char(&mut self, name: &str) -> Result<(), FormError> {
        self.store.pop_char(name)?;
        self.errors.clear_field(name);
        Ok(())
    }

    /// Check required and email fields against the current values
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for (spec, value) in self.store.snapshot().iter() {
            if value.is_empty() {
                if spec.required {
                    errors.push(spec.name, spec.missing_message());
                }
                continue;
            }
            if spec.kind == FieldKind::Email && !looks_like_email(value.as_text()) {
                errors.push(spec.name, "Enter a valid email address");
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, then move to InFlight and snapshot the values to send
    pub fn begin_submit(&mut self) -> Result<(AttemptToken, FormSnapshot), FormError> {
        self.machine.check_can_begin()?;
        if let Err(errors) = self.validate() {
            tracing::debug!(
                form = self.schema().form_name,
                count = errors.len(),
                "submission blocked by validation"
            );
            self.errors = errors.clone();
            return Err(FormError::Validation(errors));
        }

        let token = self.machine.begin_submit()?;
        self.errors = ValidationErrors::default();
        tracing::debug!(
            form = self.schema().form_name,
            attempt = %token.id(),
            version = self.store.version(),
            "snapshot taken"
        );
        Ok((token, self.store.snapshot()))
    }

    /// Settle an attempt; a success clears the form
    pub fn resolve(&mut self, token: AttemptToken, outcome: Outcome) -> Result<(), FormError> {
        let succeeded = outcome == Outcome::Succeeded;
        self.machine.resolve(token, outcome)?;
        if succeeded {
            self.store.reset();
        }
        Ok(())
    }

    /// "Submit another": back to Idle with a cleared form
    pub fn reset(&mut self) -> Result<(), FormError> {
        self.machine.reset()?;
        self.store.reset();
        self.errors = ValidationErrors::default();
        Ok(())
    }
}

/// Send a snapshot taken by [`FormController::begin_submit`] and turn the
/// reply into an outcome for [`FormController::resolve`]
///
/// Transport and server failures become `Outcome::Failed`; a call that takes
/// longer than `timeout` fails with the generic message.
pub async fn deliver(
    transport: &dyn SubmissionTransport,
    token: AttemptToken,
    snapshot: &FormSnapshot,
    timeout: Duration,
) -> Outcome {
    let form = snapshot.form_name();

    let result = match tokio::time::timeout(timeout, transport.submit(snapshot)).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout),
    };

    match result {
        Ok(()) => {
            tracing::info!(form, transport = transport.name(), attempt = %token.id(), "submission accepted");
            Outcome::Succeeded
        }
        Err(e) if e.is_rejection() => {
            let message = e.user_message();
            tracing::info!(form, transport = transport.name(), %message, "submission rejected");
            Outcome::Failed(message)
        }
        Err(e) => {
            tracing::warn!(form, transport = transport.name(), error = %e, "submission failed");
            Outcome::Failed(NETWORK_ERROR_MESSAGE.to_string())
        }
    }
}
