//! Form domain layer
//!
//! Schema-driven form handling shared by the waitlist and reservation
//! forms: field values, the observable store, validation and the
//! submission state machine.

mod controller;
mod field;
mod schema;
mod store;
mod submission;

pub use controller::{deliver, FormController};
pub use field::FieldValue;
pub use schema::{FieldKind, FieldSpec, FormKind, FormSchema, RESERVATION, WAITLIST};
pub use store::{FormSnapshot, StoreEvent};
pub use submission::{AttemptToken, Outcome, SubmissionStatus};

#[cfg(test)]
pub use store::FieldStore;
