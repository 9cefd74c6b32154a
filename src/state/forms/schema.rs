//! Static field schemas for the lead-capture forms
//!
//! A schema is plain data: the controller, store and transports are all
//! driven from it, so the two forms share every line of logic.

/// Kind of input a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, optionally multiline
    Text { multiline: bool },
    /// Free text that must look like an email address when non-empty
    Email,
    /// Exactly one of a fixed list of options (radio group)
    Choice(&'static [&'static str]),
    /// Any subset of a fixed list of options (checkbox group)
    MultiSelect(&'static [&'static str]),
}

impl FieldKind {
    /// Whether values of this kind are sets rather than strings
    pub fn is_multi(&self) -> bool {
        matches!(self, FieldKind::MultiSelect(_))
    }

    /// Declared options for choice and multi-select fields
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            FieldKind::Choice(options) | FieldKind::MultiSelect(options) => options,
            FieldKind::Text { .. } | FieldKind::Email => &[],
        }
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self, FieldKind::Text { multiline: true })
    }
}

/// Descriptor of a single form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Wire name, used as the store key and in request bodies
    pub name: &'static str,
    /// Human label shown next to the input
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Message shown when a required field is left empty
    pub required_message: Option<&'static str>,
}

impl FieldSpec {
    const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            required_message: None,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn with_required_message(mut self, message: &'static str) -> Self {
        self.required_message = Some(message);
        self
    }

    /// Message for an empty required field
    pub fn missing_message(&self) -> String {
        match self.required_message {
            Some(message) => message.to_string(),
            None => format!("{} is required", self.label),
        }
    }
}

/// The two lead-capture forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Waitlist,
    Reservation,
}

impl FormKind {
    pub fn schema(self) -> &'static FormSchema {
        match self {
            FormKind::Waitlist => &WAITLIST,
            FormKind::Reservation => &RESERVATION,
        }
    }
}

/// Descriptor of a whole form
#[derive(Debug, PartialEq, Eq)]
pub struct FormSchema {
    /// Discriminator sent as `form-name` to the form relay
    pub form_name: &'static str,
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FormSchema {
    /// Position of a field in schema order
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Tools offered in the reservation form
pub const TOOL_OPTIONS: &[&str] = &["ChatGPT", "Canva", "Netflix", "MidJourney", "Notion", "Other"];

const YES_NO: &[&str] = &["Yes", "No"];
const PREPAY_OPTIONS: &[&str] = &["yes", "maybe", "no"];
const CRYPTO_OPTIONS: &[&str] = &["yes", "no", "learn"];

/// Waitlist form submitted through the static-host form relay
pub static WAITLIST: FormSchema = FormSchema {
    form_name: "waitlist-form",
    title: "Join the Waitlist",
    fields: &[
        FieldSpec::new("fullName", "Full Name", FieldKind::Text { multiline: false }).required(),
        FieldSpec::new("email", "Email Address", FieldKind::Email).required(),
        FieldSpec::new("phone", "Phone Number", FieldKind::Text { multiline: false }),
        FieldSpec::new("country", "Country", FieldKind::Text { multiline: false }),
        FieldSpec::new(
            "tools",
            "Which tools would you like to pay-as-you-go for?",
            FieldKind::Text { multiline: true },
        ),
        FieldSpec::new(
            "dailyPrice",
            "Willing to pay for 1-day access",
            FieldKind::Text { multiline: false },
        ),
        FieldSpec::new(
            "frustration",
            "Biggest frustration with current pricing",
            FieldKind::Text { multiline: true },
        ),
        FieldSpec::new(
            "contactOnLaunch",
            "Contact me when AccessLoop launches",
            FieldKind::Choice(YES_NO),
        )
        .required()
        .with_required_message("Please tell us whether to contact you at launch"),
    ],
};

/// Reservation form submitted to the reservation API
pub static RESERVATION: FormSchema = FormSchema {
    form_name: "reservation-form",
    title: "Reserve Your Access",
    fields: &[
        FieldSpec::new("name", "Full Name", FieldKind::Text { multiline: false }).required(),
        FieldSpec::new("email", "Email Address", FieldKind::Email).required(),
        FieldSpec::new(
            "preferredTools",
            "Preferred Tools (select all that apply)",
            FieldKind::MultiSelect(TOOL_OPTIONS),
        )
        .required()
        .with_required_message("Select at least one tool"),
        FieldSpec::new(
            "dailyPrice",
            "Comfortable Daily Price",
            FieldKind::Text { multiline: false },
        )
        .required(),
        FieldSpec::new(
            "prepayWillingness",
            "Would you pre-pay to reserve access?",
            FieldKind::Choice(PREPAY_OPTIONS),
        )
        .required()
        .with_required_message("Choose whether you would pre-pay"),
        FieldSpec::new(
            "cryptoUsage",
            "Do you use crypto?",
            FieldKind::Choice(CRYPTO_OPTIONS),
        )
        .required()
        .with_required_message("Choose whether you use crypto"),
        FieldSpec::new(
            "biggestStruggle",
            "Biggest struggle accessing premium tools",
            FieldKind::Text { multiline: false },
        )
        .required(),
        FieldSpec::new(
            "contactInfo",
            "Preferred Contact (WhatsApp or Telegram)",
            FieldKind::Text { multiline: false },
        ),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn field(schema: &FormSchema, name: &str) -> &'static FieldSpec {
        let index = schema.index_of(name).unwrap();
        &schema.fields[index]
    }

    fn names(schema: &FormSchema, required: bool) -> Vec<&'static str> {
        schema
            .fields
            .iter()
            .filter(|f| f.required == required)
            .map(|f| f.name)
            .collect()
    }

    #[test]
    fn test_waitlist_required_fields() {
        assert_eq!(
            names(&WAITLIST, true),
            vec!["fullName", "email", "contactOnLaunch"]
        );
        assert_eq!(
            names(&WAITLIST, false),
            vec!["phone", "country", "tools", "dailyPrice", "frustration"]
        );
    }

    #[test]
    fn test_reservation_required_fields() {
        assert_eq!(
            names(&RESERVATION, true),
            vec![
                "name",
                "email",
                "preferredTools",
                "dailyPrice",
                "prepayWillingness",
                "cryptoUsage",
                "biggestStruggle"
            ]
        );
        assert_eq!(names(&RESERVATION, false), vec!["contactInfo"]);
    }

    #[test]
    fn test_only_preferred_tools_is_multi() {
        let multi: Vec<_> = WAITLIST
            .fields
            .iter()
            .chain(RESERVATION.fields)
            .filter(|f| f.kind.is_multi())
            .map(|f| f.name)
            .collect();
        assert_eq!(multi, vec!["preferredTools"]);
        assert_eq!(
            field(&RESERVATION, "preferredTools").kind.options(),
            TOOL_OPTIONS
        );
    }

    #[test]
    fn test_field_lookup() {
        assert_eq!(WAITLIST.index_of("email"), Some(1));
        assert_eq!(WAITLIST.index_of("preferredTools"), None);
        assert_eq!(RESERVATION.field_count(), 8);
    }

    #[test]
    fn test_missing_message() {
        let name = field(&WAITLIST, "fullName");
        assert_eq!(name.missing_message(), "Full Name is required");
        let tools = field(&RESERVATION, "preferredTools");
        assert_eq!(tools.missing_message(), "Select at least one tool");
    }

    #[test]
    fn test_multiline_flags() {
        let multiline: Vec<_> = WAITLIST
            .fields
            .iter()
            .chain(RESERVATION.fields)
            .filter(|f| f.kind.is_multiline())
            .map(|f| f.name)
            .collect();
        assert_eq!(multiline, vec!["tools", "frustration"]);
        assert!(!field(&RESERVATION, "biggestStruggle").kind.is_multiline());
    }

    #[test]
    fn test_kind_resolves_schema() {
        assert_eq!(FormKind::Waitlist.schema().form_name, "waitlist-form");
        assert_eq!(FormKind::Reservation.schema().form_name, "reservation-form");
    }
}
