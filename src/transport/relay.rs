//! Static-host form relay (`application/x-www-form-urlencoded`)

use super::traits::SubmissionTransport;
use crate::error::TransportError;
use crate::state::{FieldValue, FormSnapshot};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Posts forms to the site origin, where the host captures them
pub struct RelayTransport {
    client: reqwest::Client,
    url: String,
    accept_any_status: bool,
}

impl RelayTransport {
    /// `site_origin` is the page origin; the form is posted to its `/`
    pub fn new(client: reqwest::Client, site_origin: &str, accept_any_status: bool) -> Self {
        Self {
            client,
            url: format!("{}/", site_origin.trim_end_matches('/')),
            accept_any_status,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Percent-encode one component with the byte set browsers use for form
/// bodies: alphanumerics and `*-._` stay literal, spaces become `+`
fn encode_component(value: &str) -> String {
    urlencoding::encode(value)
        .replace("%20", "+")
        .replace("%2A", "*")
        .replace('~', "%7E")
}

/// Build the request body: `form-name` first, then every field in schema order
pub fn encode_form(snapshot: &FormSnapshot) -> String {
    let mut pairs = vec![format!("form-name={}", encode_component(snapshot.form_name()))];
    for (spec, value) in snapshot.iter() {
        let key = encode_component(spec.name);
        match value {
            FieldValue::Text(text) => pairs.push(format!("{key}={}", encode_component(text))),
            // An empty selection still names the field
            FieldValue::Multi(items) if items.is_empty() => pairs.push(format!("{key}=")),
            FieldValue::Multi(items) => {
                for item in items {
                    pairs.push(format!("{key}={}", encode_component(item)));
                }
            }
        }
    }
    pairs.join("&")
}

#[async_trait]
impl SubmissionTransport for RelayTransport {
    fn name(&self) -> &'static str {
        "form-relay"
    }

    async fn submit(&self, snapshot: &FormSnapshot) -> Result<(), TransportError> {
        let body = encode_form(snapshot);
        tracing::debug!(url = self.url(), form = snapshot.form_name(), bytes = body.len(), "posting form");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Network(e)
                }
            })?;

        let status = response.status();
        if status.is_success() || self.accept_any_status {
            return Ok(());
        }
        Err(TransportError::Status(status.as_u16()))
    }
}
