//! Submission transports for the form backends
//!
//! Two interchangeable implementations of [`SubmissionTransport`]: the
//! static-host form relay and the JSON reservation API.

mod relay;
mod reserve;
mod traits;

pub use relay::RelayTransport;
pub use reserve::ReserveTransport;
pub use traits::SubmissionTransport;

#[cfg(test)]
pub use traits::MockSubmissionTransport;

use crate::config::{Backend, LeadConfig};
use crate::error::TransportError;
use std::time::Duration;

const USER_AGENT: &str = concat!("accessloop-tui/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for every transport
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, TransportError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(TransportError::Network)
}

/// Build the transport a backend setting selects
pub fn for_backend(
    backend: Backend,
    client: reqwest::Client,
    config: &LeadConfig,
) -> Box<dyn SubmissionTransport> {
    match backend {
        Backend::Relay => Box::new(RelayTransport::new(
            client,
            &config.site_origin,
            config.relay_accept_any_status,
        )),
        Backend::ReserveApi => Box::new(ReserveTransport::new(client, &config.api_base_url)),
    }
}

/// One-shot HTTP responder for exercising transports against a real socket
#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Request as received by the responder
    #[derive(Debug)]
    pub struct CapturedRequest {
        pub head: String,
        pub body: String,
    }

    /// Response the responder sends back
    pub struct CannedResponse {
        status: u16,
        content_type: &'static str,
        body: String,
    }

    impl CannedResponse {
        pub fn status(status: u16, body: &str) -> Self {
            Self {
                status,
                content_type: "text/plain",
                body: body.to_string(),
            }
        }

        pub fn ok(body: &str) -> Self {
            Self::status(200, body)
        }

        pub fn json(status: u16, body: &str) -> Self {
            Self {
                status,
                content_type: "application/json",
                body: body.to_string(),
            }
        }
    }

    /// Client that never routes loopback traffic through a proxy
    pub fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("test client")
    }

    /// Origin of a port nothing listens on
    pub async fn closed_origin() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Accept one connection, capture the request and answer with `response`
    pub async fn serve_once(response: CannedResponse) -> (String, JoinHandle<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];

            let (head, body_start) = loop {
                let n = stream.read(&mut buf).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                raw.extend_from_slice(&buf[..n]);
                if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    break (String::from_utf8_lossy(&raw[..pos]).to_string(), pos + 4);
                }
            };

            let expected = content_length(&head);
            while raw.len() - body_start < expected {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }
            let body = String::from_utf8_lossy(&raw[body_start..]).to_string();

            let reply = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                response.status,
                response.content_type,
                response.body.len(),
                response.body
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();

            CapturedRequest { head, body }
        });

        (origin, handle)
    }
}
