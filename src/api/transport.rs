use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

use super::USER_AGENT;
use super::overpass::OverpassResponse;
use crate::error::TransportError;

/// How a query reaches an Overpass endpoint
pub trait OverpassTransport {
    /// Run `query` against `endpoint` once, without retrying
    fn execute(&self, endpoint: &str, query: &str) -> Result<OverpassResponse, TransportError>;
}

/// Transport selection for config files and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Form-encoded POST body
    #[default]
    Post,
    /// Query string GET
    Get,
}

/// Build the transport selected by `kind`
pub fn build_transport(
    kind: TransportKind,
    timeout: Duration,
) -> Result<Box<dyn OverpassTransport>, TransportError> {
    let client = build_client(timeout)?;
    Ok(match kind {
        TransportKind::Post => Box::new(PostTransport { client }),
        TransportKind::Get => Box::new(GetTransport { client }),
    })
}

fn build_client(timeout: Duration) -> Result<Client, TransportError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| TransportError::Client(e.to_string()))
}

/// Sends the query as `data=<query>` in a form-encoded POST body.
///
/// Overpass expects form data here, not a raw body.
pub struct PostTransport {
    client: Client,
}

impl OverpassTransport for PostTransport {
    fn execute(&self, endpoint: &str, query: &str) -> Result<OverpassResponse, TransportError> {
        let response = self.client.post(endpoint).form(&[("data", query)]).send()?;
        read_response(response)
    }
}

/// Sends the query as `?data=<query>` on a GET request
pub struct GetTransport {
    client: Client,
}

impl OverpassTransport for GetTransport {
    fn execute(&self, endpoint: &str, query: &str) -> Result<OverpassResponse, TransportError> {
        let response = self.client.get(endpoint).query(&[("data", query)]).send()?;
        read_response(response)
    }
}

fn read_response(response: Response) -> Result<OverpassResponse, TransportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status(status.as_u16()));
    }

    let body = response.text()?;
    decode_body(&body)
}

/// Decode an Overpass JSON body.
///
/// Overpass reports runtime failures as a 200 with a `remark`. Timeouts map
/// to `TransportError::Timeout` so the mirror gets a chance; any other
/// runtime error is `TransportError::Runtime`, never a partial result.
pub fn decode_body(body: &str) -> Result<OverpassResponse, TransportError> {
    let parsed: OverpassResponse =
        serde_json::from_str(body).map_err(|e| TransportError::Decode(e.to_string()))?;

    if parsed.timed_out() {
        return Err(TransportError::Timeout);
    }
    if let Some(remark) = parsed.runtime_error() {
        return Err(TransportError::Runtime(remark.to_string()));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_body() {
        let body = r#"{"version":0.6,"elements":[{"type":"way","id":7,"tags":{"ref":"I 95"}}]}"#;
        let response = decode_body(body).unwrap();
        assert_eq!(response.elements.len(), 1);
        assert_eq!(response.elements[0].id, 7);
    }

    #[test]
    fn test_decode_body_runtime_timeout() {
        let body = r#"{"elements":[],"remark":"runtime error: Query timed out in \"query\" at line 3 after 61 seconds."}"#;
        assert!(matches!(decode_body(body), Err(TransportError::Timeout)));
    }

    #[test]
    fn test_decode_body_runtime_error() {
        let body = r#"{"elements":[],"remark":"runtime error: Query run out of memory using about 2048 MB of RAM."}"#;
        match decode_body(body) {
            Err(TransportError::Runtime(remark)) => assert!(remark.contains("out of memory")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_decode_body_malformed() {
        assert!(matches!(
            decode_body("<html>busy</html>"),
            Err(TransportError::Decode(_))
        ));
    }

    #[test]
    fn test_build_both_transports() {
        assert!(build_transport(TransportKind::Post, Duration::from_secs(5)).is_ok());
        assert!(build_transport(TransportKind::Get, Duration::from_secs(5)).is_ok());
    }
}
