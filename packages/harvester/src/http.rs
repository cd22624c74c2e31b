//! HTTP client wrapper for talking to a Pontoon server.
//!
//! Requests are sent exactly once. Retry and backoff policies belong to the
//! caller; a failed request fails the fetch that issued it.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{HarvesterError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("pontoon-harvester/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client.
///
/// # Returns
/// A `reqwest::blocking::Client` configured with appropriate timeout and user agent.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Send a request and return the body of a successful response.
///
/// Non-2xx statuses are turned into errors by `error_for_status`, so the
/// caller can wrap every transport failure the same way.
pub fn send_for_text(request: RequestBuilder) -> std::result::Result<String, reqwest::Error> {
    let response = request.send()?;
    let status = response.status();
    tracing::debug!(status = %status, url = %response.url(), "Received response");
    response.error_for_status()?.text()
}

/// Decode a JSON response body.
///
/// # Arguments
/// * `body` - Raw response body
/// * `context` - Human readable description of the request, used in errors
pub fn decode_json<T: DeserializeOwned>(body: &str, context: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| HarvesterError::MalformedResponse {
        context: context.to_string(),
        source,
    })
}
