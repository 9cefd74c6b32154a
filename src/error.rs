//! Error types for form editing and submission

use std::fmt;

/// Message shown for every transport-level failure
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Message shown when the server rejects a submission without saying why
pub const REJECTED_FALLBACK_MESSAGE: &str = "Something went wrong";

/// A locally detected problem with one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Per-field validation messages, in schema order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for a field, if it failed validation
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Drop the message for a field once it has been edited
    pub fn clear_field(&mut self, field: &str) {
        self.0.retain(|e| e.field != field);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Errors returned by the form controller
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// Field name not in the schema, or a value of the wrong shape for it
    #[error("invalid field \"{0}\"")]
    InvalidField(String),

    /// Option not declared for a choice or multi-select field
    #[error("\"{option}\" is not an option of field \"{field}\"")]
    InvalidOption { field: String, option: String },

    /// Required fields are empty or malformed
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("a submission is already in flight")]
    AlreadyInFlight,

    #[error("no submission is in flight")]
    NotInFlight,

    /// Resolution for an attempt that is no longer current
    #[error("attempt {0} is not the current submission")]
    StaleAttempt(uuid::Uuid),

    #[error("cannot {action} while {from}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },
}

/// Errors produced while sending a submission
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Server understood the request and declined it
    #[error("submission rejected: {}", .0.join(", "))]
    Rejected(Vec<String>),

    /// Server answered with a status that is not an acceptance
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    /// Message safe to show the user
    ///
    /// Only server-supplied rejection messages are surfaced; everything else
    /// collapses into the generic retry prompt.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::Rejected(messages) => {
                let joined = messages
                    .iter()
                    .map(|m| m.trim())
                    .filter(|m| !m.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ");
                if joined.is_empty() {
                    REJECTED_FALLBACK_MESSAGE.to_string()
                } else {
                    joined
                }
            }
            _ => NETWORK_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, TransportError::Rejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message_is_verbatim() {
        let err = TransportError::Rejected(vec!["Email already registered".to_string()]);
        assert_eq!(err.user_message(), "Email already registered");
        assert!(err.is_rejection());
    }

    #[test]
    fn test_rejection_messages_are_joined() {
        let err = TransportError::Rejected(vec!["Name too short".into(), "Bad email".into()]);
        assert_eq!(err.user_message(), "Name too short, Bad email");
    }

    #[test]
    fn test_empty_rejection_falls_back() {
        assert_eq!(
            TransportError::Rejected(vec![]).user_message(),
            REJECTED_FALLBACK_MESSAGE
        );
        assert_eq!(
            TransportError::Rejected(vec!["  ".into()]).user_message(),
            REJECTED_FALLBACK_MESSAGE
        );
    }

    #[test]
    fn test_transport_failures_are_generic() {
        assert_eq!(TransportError::Timeout.user_message(), NETWORK_ERROR_MESSAGE);
        assert_eq!(TransportError::Status(502).user_message(), NETWORK_ERROR_MESSAGE);
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = TransportError::from(decode);
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_validation_errors_lookup() {
        let mut errors = ValidationErrors::default();
        errors.push("fullName", "Full Name is required");
        errors.push("email", "Enter a valid email address");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("Enter a valid email address"));
        errors.clear_field("email");
        assert_eq!(errors.get("email"), None);
        assert_eq!(errors.to_string(), "Full Name is required");
    }

    #[test]
    fn test_form_error_display() {
        let err = FormError::InvalidTransition {
            from: "idle",
            action: "reset",
        };
        assert_eq!(err.to_string(), "cannot reset while idle");
        assert_eq!(
            FormError::InvalidField("nope".into()).to_string(),
            "invalid field \"nope\""
        );
    }
}
