//! Reservation API client (`application/json`)

use super::traits::SubmissionTransport;
use crate::error::TransportError;
use crate::state::FormSnapshot;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

/// Path of the reservation endpoint below the API base URL
pub const RESERVE_PATH: &str = "/api/reserve";

/// Reply body of the reservation endpoint
#[derive(Debug, Deserialize)]
struct ReserveResponse {
    /// Anything but an explicit `true` is a rejection
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    errors: Option<Vec<String>>,
}

/// Posts JSON-encoded forms to the custom reservation API
pub struct ReserveTransport {
    client: reqwest::Client,
    url: String,
}

impl ReserveTransport {
    pub fn new(client: reqwest::Client, api_base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}{RESERVE_PATH}", api_base_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Decide the outcome from the status line and raw body
///
/// A JSON `success` flag wins over the status code; a 2xx reply with an
/// empty body counts as acceptance. A JSON object without the flag is a
/// rejection with no reasons.
fn interpret(status: StatusCode, body: &str) -> Result<(), TransportError> {
    if body.trim().is_empty() {
        return if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Status(status.as_u16()))
        };
    }

    let reply: ReserveResponse = match serde_json::from_str(body) {
        Ok(reply) => reply,
        Err(_) if !status.is_success() => return Err(TransportError::Status(status.as_u16())),
        Err(e) => return Err(TransportError::Decode(e)),
    };

    if reply.success == Some(true) {
        Ok(())
    } else {
        Err(TransportError::Rejected(reply.errors.unwrap_or_default()))
    }
}

#[async_trait]
impl SubmissionTransport for ReserveTransport {
    fn name(&self) -> &'static str {
        "reserve-api"
    }

    async fn submit(&self, snapshot: &FormSnapshot) -> Result<(), TransportError> {
        tracing::debug!(url = self.url(), form = snapshot.form_name(), "posting reservation");

        let response = self
            .client
            .post(&self.url)
            .json(snapshot)
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
        let body = response.text().await.map_err(TransportError::Network)?;
        interpret(status, &body)
    }
}
