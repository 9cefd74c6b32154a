//! Submission state machine
//!
//! `Idle -> InFlight -> {Succeeded, Failed}`, `Succeeded -> Idle` on reset and
//! `Failed -> InFlight` on resubmission. Nothing else is allowed.

use crate::error::FormError;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identifies one submission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptToken(Uuid);

impl AttemptToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

/// Result of sending one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    /// Carries the message to display
    Failed(String),
}

/// Where the current attempt stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    InFlight,
    Succeeded { at: DateTime<Utc> },
    Failed { message: String },
}

impl SubmissionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InFlight => "in flight",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Failure message, if the last attempt failed
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Tracks the single submission a form may have in flight
#[derive(Debug, Default)]
pub struct SubmissionMachine {
    status: SubmissionStatus,
    current: Option<AttemptToken>,
}

impl SubmissionMachine {
    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    /// Whether an attempt may start now
    pub fn check_can_begin(&self) -> Result<(), FormError> {
        match self.status {
            SubmissionStatus::InFlight => Err(FormError::AlreadyInFlight),
            SubmissionStatus::Succeeded { .. } => Err(FormError::InvalidTransition {
                from: self.status.label(),
                action: "submit",
            }),
            SubmissionStatus::Idle | SubmissionStatus::Failed { .. } => Ok(()),
        }
    }

    /// Start an attempt from Idle or Failed
    pub fn begin_submit(&mut self) -> Result<AttemptToken, FormError> {
        self.check_can_begin()?;
        let token = AttemptToken::new();
        self.status = SubmissionStatus::InFlight;
        self.current = Some(token);
        tracing::debug!(attempt = %token.id(), "submission in flight");
        Ok(token)
    }

    /// Settle the in-flight attempt identified by `token`
    pub fn resolve(&mut self, token: AttemptToken, outcome: Outcome) -> Result<(), FormError> {
        let current = self.current.ok_or(FormError::NotInFlight)?;
        if current != token {
            return Err(FormError::StaleAttempt(token.id()));
        }

        self.current = None;
        self.status = match outcome {
            Outcome::Succeeded => SubmissionStatus::Succeeded { at: Utc::now() },
            Outcome::Failed(message) => SubmissionStatus::Failed { message },
        };
        tracing::debug!(attempt = %token.id(), status = self.status.label(), "submission resolved");
        Ok(())
    }

    /// Return to Idle after a success
    pub fn reset(&mut self) -> Result<(), FormError> {
        if !self.status.is_succeeded() {
            return Err(FormError::InvalidTransition {
                from: self.status.label(),
                action: "reset",
            });
        }
        self.status = SubmissionStatus::Idle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let machine = SubmissionMachine::default();
        assert_eq!(machine.status(), &SubmissionStatus::Idle);
    }

    #[test]
    fn test_begin_while_in_flight_fails() {
        let mut machine = SubmissionMachine::default();
        machine.begin_submit().unwrap();
        assert_eq!(machine.begin_submit(), Err(FormError::AlreadyInFlight));
        assert!(machine.status().is_in_flight());
    }

    #[test]
    fn test_success_path() {
        let mut machine = SubmissionMachine::default();
        let token = machine.begin_submit().unwrap();
        machine.resolve(token, Outcome::Succeeded).unwrap();
        assert!(machine.status().is_succeeded());
        machine.reset().unwrap();
        assert_eq!(machine.status(), &SubmissionStatus::Idle);
    }

    #[test]
    fn test_failed_allows_retry() {
        let mut machine = SubmissionMachine::default();
        let token = machine.begin_submit().unwrap();
        machine
            .resolve(token, Outcome::Failed("boom".into()))
            .unwrap();
        assert_eq!(machine.status().error_message(), Some("boom"));

        let retry = machine.begin_submit().unwrap();
        assert_ne!(retry, token);
        assert!(machine.status().is_in_flight());
    }

    #[test]
    fn test_resolve_requires_in_flight() {
        let mut machine = SubmissionMachine::default();
        let token = machine.begin_submit().unwrap();
        machine.resolve(token, Outcome::Succeeded).unwrap();
        assert_eq!(
            machine.resolve(token, Outcome::Succeeded),
            Err(FormError::NotInFlight)
        );
    }

    #[test]
    fn test_resolve_rejects_stale_token() {
        let mut machine = SubmissionMachine::default();
        let first = machine.begin_submit().unwrap();
        machine
            .resolve(first, Outcome::Failed("x".into()))
            .unwrap();
        let _second = machine.begin_submit().unwrap();
        assert_eq!(
            machine.resolve(first, Outcome::Succeeded),
            Err(FormError::StaleAttempt(first.id()))
        );
        assert!(machine.status().is_in_flight());
    }

    #[test]
    fn test_reset_only_from_succeeded() {
        let mut machine = SubmissionMachine::default();
        assert!(matches!(
            machine.reset(),
            Err(FormError::InvalidTransition { action: "reset", .. })
        ));

        let token = machine.begin_submit().unwrap();
        assert!(machine.reset().is_err());
        machine
            .resolve(token, Outcome::Failed("x".into()))
            .unwrap();
        assert!(machine.reset().is_err());
    }

    #[test]
    fn test_submit_from_succeeded_requires_reset() {
        let mut machine = SubmissionMachine::default();
        let token = machine.begin_submit().unwrap();
        machine.resolve(token, Outcome::Succeeded).unwrap();
        assert_eq!(
            machine.begin_submit(),
            Err(FormError::InvalidTransition {
                from: "succeeded",
                action: "submit"
            })
        );
    }
}
