//! Shared fetch plumbing for provider calls
//!
//! Every provider request is bounded by a short timeout and retried a
//! small number of times on transient failures. Retries only apply to
//! these idempotent GETs.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::debug;

use crate::{SourceError, SourceResult};

/// Per-call timeout for provider requests.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_RETRIES: u32 = 2;
const BACKOFF: Duration = Duration::from_millis(500);

/// Client shared by all adapters.
pub fn build_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!("wxfuse/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// GET `url` with `query` and decode the JSON body into `T`.
///
/// Rate-limit and server-error responses, plus transport errors, are
/// retried up to two times with linear backoff. Anything else (client
/// errors, undecodable payloads) fails immediately.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    source_id: &'static str,
    url: &str,
    query: &[(&str, String)],
) -> SourceResult<T> {
    let mut attempt: u32 = 0;
    loop {
        match try_get(client, source_id, url, query).await {
            Ok(body) => {
                return serde_json::from_str(&body)
                    .map_err(|cause| SourceError::Decode { source_id, cause })
            }
            Err(err) if attempt < MAX_RETRIES && is_transient(&err) => {
                attempt += 1;
                debug!(source = source_id, attempt, error = %err, "retrying fetch");
                sleep(BACKOFF * attempt).await;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn try_get(
    client: &Client,
    source_id: &'static str,
    url: &str,
    query: &[(&str, String)],
) -> SourceResult<String> {
    let response = client.get(url).query(query).send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(SourceError::Status {
            source_id,
            status,
            body: truncate_body(&body),
        });
    }
    Ok(body)
}

fn is_transient(err: &SourceError) -> bool {
    match err {
        SourceError::Transport(_) => true,
        SourceError::Status { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        SourceError::Decode { .. } => false,
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_and_server_errors_are_transient() {
        let rate_limited = SourceError::Status {
            source_id: "openmeteo",
            status: StatusCode::TOO_MANY_REQUESTS,
            body: String::new(),
        };
        let server_error = SourceError::Status {
            source_id: "openmeteo",
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        assert!(is_transient(&rate_limited));
        assert!(is_transient(&server_error));
    }

    #[test]
    fn client_errors_are_not_retried() {
        let unauthorized = SourceError::Status {
            source_id: "weatherapi",
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        };
        assert!(!is_transient(&unauthorized));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(500);
        let truncated = truncate_body(&body);
        assert!(truncated.len() < body.len());
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn short_bodies_pass_through() {
        assert_eq!(truncate_body("not found"), "not found");
    }
}
