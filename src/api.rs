//! HTTP helpers for the empdesk JSON API with one timeout policy and
//! consistent error mapping. Feature clients go through these helpers so
//! request setup, error-message extraction, and bearer handling stay in one
//! place. The helpers hold no state and never log token material.

use crate::errors::Error;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Maximum number of error body characters surfaced to the caller.
const MAX_ERROR_CHARS: usize = 200;

/// Builds the shared HTTP client with the configured timeout.
pub(crate) fn client(timeout: Duration, user_agent: &str) -> Result<Client, Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|err| Error::Config(format!("failed to build HTTP client: {err}")))
}

/// Joins the configured base URL and a path without doubling slashes.
pub(crate) fn build_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Sends a request and parses a JSON reply.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, Error> {
    let response = request.send().await.map_err(map_request_error)?;
    handle_json_response(response).await
}

/// Sends a request and discards any success body.
pub(crate) async fn send_empty(request: RequestBuilder) -> Result<(), Error> {
    let response = request.send().await.map_err(map_request_error)?;
    if response.status().is_success() {
        Ok(())
    } else {
        Err(failure(response).await)
    }
}

/// Sends a request and returns the success body as plain text (the employee
/// upload/delete endpoints reply with text, not JSON).
pub(crate) async fn send_text(request: RequestBuilder) -> Result<String, Error> {
    let response = request.send().await.map_err(map_request_error)?;
    if response.status().is_success() {
        response
            .text()
            .await
            .map_err(|err| Error::Transport(format!("failed to read response: {err}")))
    } else {
        Err(failure(response).await)
    }
}

fn map_request_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Transport("request timed out".to_string())
    } else {
        Error::Transport(format!("unable to reach the server: {err}"))
    }
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| Error::Transport(format!("failed to decode response: {err}")))
    } else {
        Err(failure(response).await)
    }
}

/// Maps a non-success reply: client errors are backend-reported rejections,
/// server errors count as transport failures.
async fn failure(response: Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status.as_u16(), &body);

    if status.is_client_error() {
        Error::Rejected(message)
    } else {
        Error::Transport(message)
    }
}

/// Prefers the backend `message` field, falling back to the sanitized body.
fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| sanitize_body(status, body))
}

/// Sanitizes raw error bodies for user-facing messages by trimming and
/// truncating.
fn sanitize_body(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Request failed ({status}).")
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
