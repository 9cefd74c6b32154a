//! Form rendering module
//!
//! - `field_renderer`: per-kind field widgets
//! - `lead_form`: the waitlist and reservation forms
//! - `success`: thank-you panel after an accepted submission

mod field_renderer;
mod lead_form;
mod success;

pub use lead_form::draw as draw_lead_form;
pub use success::draw as draw_success;
